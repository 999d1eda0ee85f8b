//! Port contracts for tracker persistence.

pub mod task;
pub mod workflow;

pub use task::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use workflow::{WorkflowRepository, WorkflowRepositoryError, WorkflowRepositoryResult};
