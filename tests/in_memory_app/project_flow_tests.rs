//! Project flows across setup, activity, permissions and repositories.

use projector::accounts::Principal;
use projector::activity::{ActionRepository, ActionVerb, FeedChannel};
use projector::project::domain::ProjectState;
use projector::project::services::CreateProjectRequest;
use projector::vcs::{VcsAccessError, VcsOperation, authorize};
use rstest::rstest;

use super::helpers::{App, app};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn forking_is_recorded_on_the_original_project(app: App) -> Result<(), eyre::Report> {
    let joe = app.user("joe")?;
    let jack = app.user("jack")?;
    let foobar = app.project(&joe, "foobar").await?;

    let created = app.actions.list_for_project(foobar.id()).await?;
    eyre::ensure!(created.len() == 1, "expected one action, got {created:?}");
    let first = created
        .first()
        .ok_or_else(|| eyre::eyre!("missing created action"))?;
    eyre::ensure!(first.verb() == ActionVerb::Created, "unexpected verb");

    let fork = app
        .projects
        .fork_project(&Principal::from(jack), foobar.id(), false)
        .await?;

    let original_actions = app.actions.list_for_project(foobar.id()).await?;
    let verbs: Vec<_> = original_actions.iter().map(|action| action.verb()).collect();
    eyre::ensure!(
        verbs == vec![ActionVerb::Created, ActionVerb::Forked],
        "unexpected verbs {verbs:?}"
    );
    let fork_actions = app.actions.list_for_project(fork.id()).await?;
    eyre::ensure!(fork_actions.is_empty(), "fork has actions {fork_actions:?}");
    eyre::ensure!(fork.state() == ProjectState::Ready, "fork not ready");
    eyre::ensure!(
        app.vcs.repository_of(fork.id()).is_some(),
        "fork repository missing"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repository_access_follows_project_permissions(app: App) -> Result<(), eyre::Report> {
    let joe = app.user("joe")?;
    let jack = app.user("jack")?;
    let foobar = app.project(&joe, "foobar").await?;
    let jack_principal = Principal::from(jack.clone());

    let pull = authorize(&*app.permissions, &jack_principal, &foobar, VcsOperation::Pull).await;
    eyre::ensure!(pull.is_ok(), "public pull refused: {pull:?}");

    let push = authorize(&*app.permissions, &jack_principal, &foobar, VcsOperation::Push).await;
    eyre::ensure!(
        matches!(push, Err(VcsAccessError::Permission(_))),
        "push allowed before membership: {push:?}"
    );

    app.projects
        .add_member(&Principal::from(joe), foobar.id(), jack.id())
        .await?;
    let member_push =
        authorize(&*app.permissions, &jack_principal, &foobar, VcsOperation::Push).await;
    eyre::ensure!(member_push.is_ok(), "member push refused: {member_push:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn public_feed_and_activity_skip_private_work(app: App) -> Result<(), eyre::Report> {
    let joe = app.user("joe")?;
    app.project(&joe, "open").await?;
    app.projects
        .create_project(
            &Principal::from(joe),
            CreateProjectRequest::new("hidden").private(),
        )
        .await?;

    let feed = app
        .projects
        .feed(&FeedChannel::new("Projects", "https://example.org", "Latest"))
        .await?;
    eyre::ensure!(feed.contains("<title>open</title>"), "public project missing");
    eyre::ensure!(!feed.contains("hidden"), "private project leaked");

    let public = app.actions.list_public(10).await?;
    eyre::ensure!(public.len() == 1, "expected one public action, got {public:?}");
    Ok(())
}
