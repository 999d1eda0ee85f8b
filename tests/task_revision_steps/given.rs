//! Given steps for task revision BDD scenarios.

use std::collections::BTreeSet;

use eyre::WrapErr;
use projector::accounts::Principal;
use projector::tracker::services::CreateTaskRequest;
use rstest_bdd_macros::given;

use super::world::{RevisionWorld, run_async};

#[given(r#"a ready project "{name}" owned by "{owner}""#)]
fn ready_project(world: &mut RevisionWorld, name: String, owner: String) -> Result<(), eyre::Report> {
    let user = world.app.user(&owner)?;
    let project = run_async(world.app.project(&user, &name)).wrap_err("create scenario project")?;
    world.author = Some(Principal::from(user));
    world.project = Some(project);
    Ok(())
}

#[given(r#"a task "{summary}""#)]
fn a_task(world: &mut RevisionWorld, summary: String) -> Result<(), eyre::Report> {
    let principal = world.author()?.clone();
    let project = world.project()?.id();
    let task = run_async(
        world
            .app
            .tasks
            .create_task(&principal, CreateTaskRequest::new(project, summary)),
    )
    .wrap_err("create scenario task")?;
    world.task = Some(task);
    Ok(())
}

#[given(r#"status "{source}" may only move to "{destination}""#)]
fn restrict_destinations(
    world: &mut RevisionWorld,
    source: String,
    destination: String,
) -> Result<(), eyre::Report> {
    let principal = world.author()?.clone();
    let project = world.project()?.clone();
    let from = run_async(world.app.status(&project, &source))?;
    let to = run_async(world.app.status(&project, &destination))?;
    run_async(world.app.workflow_service.set_destinations(
        &principal,
        project.id(),
        from,
        BTreeSet::from([to]),
    ))
    .wrap_err("restrict status destinations")?;
    Ok(())
}
