//! In-memory tracker repositories.

mod task;
mod workflow;

pub use task::InMemoryTaskRepository;
pub use workflow::InMemoryWorkflowRepository;
