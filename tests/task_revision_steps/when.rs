//! When steps for task revision BDD scenarios.

use projector::tracker::domain::TaskFields;
use rstest_bdd_macros::when;

use super::world::{RevisionWorld, run_async};

#[when(r#"the summary is changed to "{summary}""#)]
fn change_summary(world: &mut RevisionWorld, summary: String) -> Result<(), eyre::Report> {
    let fields = TaskFields {
        summary,
        ..world.task()?.fields().clone()
    };
    world.submit(fields, None)
}

#[when(r#"the task is commented with "{comment}""#)]
fn comment_task(world: &mut RevisionWorld, comment: String) -> Result<(), eyre::Report> {
    let fields = world.task()?.fields().clone();
    world.submit(fields, Some(comment))
}

#[when("the task is saved without changes")]
fn save_unchanged(world: &mut RevisionWorld) -> Result<(), eyre::Report> {
    let fields = world.task()?.fields().clone();
    world.submit(fields, None)
}

#[when(r#"the status is changed to "{status}""#)]
fn change_status(world: &mut RevisionWorld, status: String) -> Result<(), eyre::Report> {
    let project = world.project()?.clone();
    let target = run_async(world.app.status(&project, &status))?;
    let fields = TaskFields {
        status: target,
        ..world.task()?.fields().clone()
    };
    world.submit(fields, None)
}
