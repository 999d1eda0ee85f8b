//! `PostgreSQL` adapters for tracker persistence.

mod models;
mod schema;
mod task;
mod workflow;

pub use task::PostgresTaskRepository;
pub use workflow::PostgresWorkflowRepository;
