//! Given steps for project setup BDD scenarios.

use eyre::WrapErr;
use rstest_bdd_macros::given;

use super::world::{ProjectWorld, run_async};

#[given(r#"a user "{name}""#)]
fn a_user(world: &mut ProjectWorld, name: String) -> Result<(), eyre::Report> {
    let user = world.app.user(&name)?;
    world.users.insert(name, user);
    Ok(())
}

#[given(r#""{author}" has created the project "{name}""#)]
fn project_created(
    world: &mut ProjectWorld,
    author: String,
    name: String,
) -> Result<(), eyre::Report> {
    let user = world.user(&author)?.clone();
    let project = run_async(world.app.project(&user, &name))
        .wrap_err("create project for scenario setup")?;
    world.projects.insert(name, project);
    Ok(())
}
