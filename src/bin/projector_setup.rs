//! Re-runs project setup for one project against `PostgreSQL`.
//!
//! Usage:
//!
//! ```text
//! projector-setup <project-id> [--vcs git|hg] [--workflow <name>]
//! ```
//!
//! Configuration is read from `projector.toml` and `PROJECTOR_*` environment
//! variables. A project left in the error state is reset and set up again;
//! a ready project stays ready.

use projector::accounts::adapters::memory::InMemoryUserDirectory;
use projector::ProjectorError;
use projector::config::ProjectorConfig;
use projector::permission::PermissionService;
use projector::permission::adapters::postgres::PostgresPermissionRepository;
use projector::persistence;
use projector::project::adapters::postgres::PostgresProjectRepository;
use projector::project::domain::ProjectId;
use projector::project::services::{ProjectSetupService, SetupDependencies, SetupRequest};
use projector::telemetry;
use projector::tracker::adapters::postgres::PostgresWorkflowRepository;
use projector::vcs::adapters::CommandVcsBackend;
use projector::vcs::VcsAlias;
use projector::workflow::{WorkflowId, WorkflowRegistry};
use mockable::DefaultClock;
use std::env;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
enum SetupCliError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("logging init failed: {0}")]
    Telemetry(String),
    #[error("database connection failed: {0}")]
    Database(String),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error(transparent)]
    Projector(#[from] ProjectorError),
}

#[derive(Debug, PartialEq, Eq)]
struct SetupArgs {
    project: ProjectId,
    vcs: Option<VcsAlias>,
    workflow: Option<WorkflowId>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = collect_args()?;
    run(parse_args(args.into_iter())?).map_err(Into::into)
}

fn collect_args() -> Result<Vec<String>, SetupCliError> {
    env::args_os()
        .map(|arg_os| {
            arg_os
                .into_string()
                .map_err(|_| SetupCliError::InvalidArgs("argument is not valid UTF-8".into()))
        })
        .collect()
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<SetupArgs, SetupCliError> {
    let _program = args.next();
    let raw_project = args
        .next()
        .ok_or_else(|| SetupCliError::InvalidArgs("missing project id argument".into()))?;
    let project = Uuid::parse_str(&raw_project)
        .map(ProjectId::from_uuid)
        .map_err(|err| SetupCliError::InvalidArgs(format!("invalid project id: {err}")))?;

    let mut vcs = None;
    let mut workflow = None;
    while let Some(flag) = args.next() {
        let value = args
            .next()
            .ok_or_else(|| SetupCliError::InvalidArgs(format!("missing value for {flag}")))?;
        match flag.as_str() {
            "--vcs" => {
                let alias = VcsAlias::try_from(value.as_str())
                    .map_err(|err| SetupCliError::InvalidArgs(err.to_string()))?;
                vcs = Some(alias);
            }
            "--workflow" => {
                let id = WorkflowId::new(value)
                    .map_err(|err| SetupCliError::InvalidArgs(err.to_string()))?;
                workflow = Some(id);
            }
            other => {
                return Err(SetupCliError::InvalidArgs(format!(
                    "unexpected argument: {other}"
                )));
            }
        }
    }
    Ok(SetupArgs {
        project,
        vcs,
        workflow,
    })
}

fn run(args: SetupArgs) -> Result<(), SetupCliError> {
    let config = ProjectorConfig::load().map_err(ProjectorError::from)?;
    telemetry::init("info").map_err(|err| SetupCliError::Telemetry(err.to_string()))?;
    let pool = persistence::connect(&config.database.url, config.database.max_connections)
        .map_err(|err| SetupCliError::Database(err.to_string()))?;

    let vcs = CommandVcsBackend::new(config.vcs.root.clone())
        .with_programs(config.vcs.git_program.clone(), config.vcs.hg_program.clone());
    let deps = SetupDependencies {
        projects: Arc::new(PostgresProjectRepository::new(pool.clone())),
        workflow: Arc::new(PostgresWorkflowRepository::new(pool.clone())),
        permissions: Arc::new(PermissionService::new(
            Arc::new(PostgresPermissionRepository::new(pool)),
            Arc::new(InMemoryUserDirectory::new()),
        )),
        vcs: Arc::new(vcs),
        registry: Arc::new(WorkflowRegistry::new()),
        clock: Arc::new(DefaultClock),
    };
    let service = ProjectSetupService::new(deps)
        .with_tracker_settings(config.tracker)
        .with_repository_creation(config.setup.create_repositories);
    let request = SetupRequest {
        vcs: args.vcs.or(Some(config.setup.default_vcs)),
        workflow: args
            .workflow
            .unwrap_or_else(|| config.setup.default_workflow_id()),
    };

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(SetupCliError::RuntimeInit)?;
    let project = runtime
        .block_on(service.setup(args.project, &request))
        .map_err(ProjectorError::from)?;
    info!(project = %project.id(), state = %project.state(), "setup complete");
    Ok(())
}
