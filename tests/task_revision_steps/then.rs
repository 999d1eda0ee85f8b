//! Then steps for task revision BDD scenarios.

use projector::tracker::domain::{TaskRevision, TrackerDomainError};
use projector::tracker::services::{TaskEdit, TaskServiceError};
use rstest_bdd_macros::then;

use super::world::{RevisionWorld, run_async};

fn last_edit(world: &RevisionWorld) -> Result<&Result<TaskEdit, TaskServiceError>, eyre::Report> {
    world
        .last_edit
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no edit was submitted"))
}

fn history(world: &RevisionWorld) -> Result<Vec<TaskRevision>, eyre::Report> {
    let principal = world.author()?;
    let project = world.project()?.id();
    let number = world.task()?.number();
    Ok(run_async(world.app.tasks.revisions(principal, project, number))?)
}

#[then("the task is at revision {revision:u32}")]
fn task_at_revision(world: &RevisionWorld, revision: u32) -> Result<(), eyre::Report> {
    let stored = history(world)?;
    let latest = stored
        .last()
        .ok_or_else(|| eyre::eyre!("task has no revisions"))?;
    eyre::ensure!(
        latest.revision == revision,
        "expected revision {revision}, found {}",
        latest.revision
    );
    Ok(())
}

#[then(r#"the latest revision changed "{field}""#)]
fn latest_changed(world: &RevisionWorld, field: String) -> Result<(), eyre::Report> {
    let edit = last_edit(world)?
        .as_ref()
        .map_err(|err| eyre::eyre!("edit failed: {err}"))?;
    let changed: Vec<&str> = edit.changes.iter().map(|change| change.field.as_str()).collect();
    eyre::ensure!(
        changed == vec![field.as_str()],
        "expected {field} to change, found {changed:?}"
    );
    Ok(())
}

#[then("the latest revision changed nothing")]
fn latest_changed_nothing(world: &RevisionWorld) -> Result<(), eyre::Report> {
    let edit = last_edit(world)?
        .as_ref()
        .map_err(|err| eyre::eyre!("edit failed: {err}"))?;
    eyre::ensure!(edit.changes.is_empty(), "unexpected changes {:?}", edit.changes);
    eyre::ensure!(
        edit.revision.comment.is_some(),
        "comment was not stored on the revision"
    );
    Ok(())
}

#[then("the edit is rejected because nothing changed")]
fn rejected_no_changes(world: &RevisionWorld) -> Result<(), eyre::Report> {
    let result = last_edit(world)?;
    eyre::ensure!(
        matches!(
            result,
            Err(TaskServiceError::Domain(TrackerDomainError::NoChangesMade))
        ),
        "expected a no-changes rejection, got {result:?}"
    );
    Ok(())
}

#[then("the edit is rejected as an illegal status change")]
fn rejected_illegal_status(world: &RevisionWorld) -> Result<(), eyre::Report> {
    let result = last_edit(world)?;
    eyre::ensure!(
        matches!(
            result,
            Err(TaskServiceError::Domain(
                TrackerDomainError::IllegalStatusChange { .. }
            ))
        ),
        "expected an illegal status change, got {result:?}"
    );
    Ok(())
}
