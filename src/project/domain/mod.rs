//! Domain model for projects, their lifecycle and their fork tree.
//!
//! A project is created `Pending` and driven through an explicit checkpoint
//! ladder by setup. Memberships, teams and the per-project configuration
//! live next to the aggregate.

mod config;
mod error;
mod fork;
mod ids;
mod membership;
mod name;
mod project;
mod state;

pub use config::ProjectConfig;
pub use error::{ForkError, ParseProjectStateError, ParseVisibilityError, ProjectDomainError};
pub use fork::{ensure_can_fork, ensure_fork_principal};
pub use ids::ProjectId;
pub use membership::{Membership, Team};
pub use name::{ProjectName, ProjectSlug};
pub use project::{NewProject, PersistedProjectData, Project, Visibility};
pub use state::ProjectState;
