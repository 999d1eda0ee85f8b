//! Then steps for project setup BDD scenarios.

use projector::activity::ActionRepository;
use projector::project::domain::{ForkError, Project, ProjectDomainError};
use projector::project::services::ProjectServiceError;
use projector::tracker::ports::WorkflowRepository;
use rstest_bdd_macros::then;

use super::world::{ProjectWorld, run_async};

fn last_project(world: &ProjectWorld) -> Result<&Project, eyre::Report> {
    world.last_project.as_ref().ok_or_else(|| {
        eyre::eyre!("expected a project, the step failed with {:?}", world.last_error)
    })
}

#[then(r#"the project state is "{state}""#)]
fn project_state_is(world: &ProjectWorld, state: String) -> Result<(), eyre::Report> {
    let project = last_project(world)?;
    eyre::ensure!(
        project.state().as_str() == state,
        "expected state {state}, found {}",
        project.state()
    );
    Ok(())
}

#[then("the project has {count:u64} statuses")]
fn project_has_statuses(world: &ProjectWorld, count: u64) -> Result<(), eyre::Report> {
    let project = last_project(world)?;
    let statuses = run_async(world.app.workflow.list_statuses(project.id()))?;
    eyre::ensure!(
        u64::try_from(statuses.len())? == count,
        "expected {count} statuses, found {}",
        statuses.len()
    );
    Ok(())
}

#[then(r#"the project has a "{alias}" repository"#)]
fn project_has_repository(world: &ProjectWorld, alias: String) -> Result<(), eyre::Report> {
    let project = last_project(world)?;
    let repository = project
        .repository()
        .ok_or_else(|| eyre::eyre!("project has no repository"))?;
    eyre::ensure!(
        repository.alias().as_str() == alias,
        "expected a {alias} repository, found {}",
        repository.alias()
    );
    eyre::ensure!(
        world.app.vcs.repository_of(project.id()).as_ref() == Some(repository),
        "backend does not know the repository"
    );
    Ok(())
}

#[then(r#"the activity of "{name}" is "{verbs}""#)]
fn activity_is(world: &ProjectWorld, name: String, verbs: String) -> Result<(), eyre::Report> {
    let project = world.project(&name)?;
    let actions = run_async(world.app.actions.list_for_project(project.id()))?;
    let recorded: Vec<&str> = actions.iter().map(|action| action.verb().as_str()).collect();
    let expected: Vec<&str> = verbs.split(", ").collect();
    eyre::ensure!(
        recorded == expected,
        "expected activity {expected:?}, found {recorded:?}"
    );
    Ok(())
}

#[then("the fork has no activity")]
fn fork_has_no_activity(world: &ProjectWorld) -> Result<(), eyre::Report> {
    let fork = last_project(world)?;
    eyre::ensure!(fork.is_fork(), "the last project is not a fork");
    let actions = run_async(world.app.actions.list_for_project(fork.id()))?;
    eyre::ensure!(actions.is_empty(), "fork has activity {actions:?}");
    Ok(())
}

#[then("the fork is rejected because the user owns the project")]
fn fork_rejected_as_own(world: &ProjectWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        matches!(
            world.last_error,
            Some(ProjectServiceError::Fork(ForkError::OwnProject(_)))
        ),
        "expected an own-project rejection, got {:?}",
        world.last_error
    );
    Ok(())
}

#[then("creation fails because the name is not allowed")]
fn creation_fails_banned(world: &ProjectWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        matches!(
            world.last_error,
            Some(ProjectServiceError::Domain(
                ProjectDomainError::BannedProjectName(_)
            ))
        ),
        "expected a banned name error, got {:?}",
        world.last_error
    );
    Ok(())
}
