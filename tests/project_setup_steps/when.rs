//! When steps for project setup BDD scenarios.

use projector::accounts::Principal;
use projector::project::services::CreateProjectRequest;
use rstest_bdd_macros::when;

use super::world::{ProjectWorld, run_async};

#[when(r#""{author}" creates the project "{name}""#)]
fn create_project(
    world: &mut ProjectWorld,
    author: String,
    name: String,
) -> Result<(), eyre::Report> {
    let principal = Principal::from(world.user(&author)?.clone());
    let result = run_async(
        world
            .app
            .projects
            .create_project(&principal, CreateProjectRequest::new(name.clone())),
    );
    if let Ok(ref project) = result {
        world.projects.insert(name, project.clone());
    }
    world.record(result);
    Ok(())
}

#[when(r#""{user}" forks "{name}""#)]
fn fork_project(world: &mut ProjectWorld, user: String, name: String) -> Result<(), eyre::Report> {
    let principal = Principal::from(world.user(&user)?.clone());
    let original = world.project(&name)?.id();
    let result = run_async(world.app.projects.fork_project(&principal, original, false));
    world.record(result);
    Ok(())
}
