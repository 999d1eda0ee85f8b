//! Tracker orchestration services.

pub mod task;
pub mod workflow;

pub use task::{CreateTaskRequest, TaskEdit, TaskService, TaskServiceError, TaskServiceResult};
pub use workflow::{
    WorkflowService, WorkflowServiceError, WorkflowServiceResult, create_all_transitions,
    materialize_workflow,
};
