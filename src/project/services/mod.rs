//! Project orchestration services.

pub mod lifecycle;
pub mod runner;
pub mod setup;

pub use lifecycle::{
    CreateProjectRequest, ProjectService, ProjectServiceError, ProjectServiceResult,
};
pub use runner::BackgroundSetup;
pub use setup::{
    ProjectSetup, ProjectSetupError, ProjectSetupResult, ProjectSetupService, SetupDependencies,
    SetupRequest,
};
