//! Workflow definitions used to seed a new project's task taxonomy.
//!
//! A workflow names the components, task types, priorities and statuses a
//! project starts with. Definitions are registered explicitly in a
//! [`WorkflowRegistry`] keyed by [`WorkflowId`]; project setup resolves the
//! requested identifier through the registry and materializes the entities.

mod definition;
mod error;
mod registry;

pub use definition::{RankedName, StatusSpec, WorkflowDefinition, WorkflowId};
pub use error::WorkflowError;
pub use registry::WorkflowRegistry;
