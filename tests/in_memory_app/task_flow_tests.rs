//! Task flows: editing through the workflow, history and change mail.

use std::collections::BTreeSet;

use projector::accounts::Principal;
use projector::activity::{ActionRepository, ActionVerb};
use projector::tracker::domain::{ChangesetField, TaskFields, TrackerDomainError};
use projector::tracker::services::{CreateTaskRequest, TaskServiceError};
use rstest::rstest;

use super::helpers::{App, app};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_change_mails_watchers_and_records_history(
    app: App,
) -> Result<(), eyre::Report> {
    let joe = app.user("joe")?;
    let jack = app.user("jack")?;
    let joe_principal = Principal::from(joe.clone());
    let jack_principal = Principal::from(jack.clone());
    let foobar = app.project(&joe, "foobar").await?;
    app.projects
        .add_member(&joe_principal, foobar.id(), jack.id())
        .await?;

    let task = app
        .tasks
        .create_task(
            &jack_principal,
            CreateTaskRequest::new(foobar.id(), "Crash on save"),
        )
        .await?;
    eyre::ensure!(app.mailer.sent()?.is_empty(), "creator was mailed");

    let fixed = app.status(&foobar, "Fixed").await?;
    let proposed = TaskFields {
        status: fixed,
        ..task.fields().clone()
    };
    let edit = app
        .tasks
        .edit_task(
            &joe_principal,
            foobar.id(),
            task.number(),
            proposed,
            Some("Fixed in 1.1".to_owned()),
        )
        .await?;
    eyre::ensure!(edit.revision.revision == 1, "unexpected revision");
    eyre::ensure!(
        edit.changes.fields() == vec![ChangesetField::Status],
        "unexpected changes {:?}",
        edit.changes
    );

    let sent = app.mailer.sent()?;
    let [mail] = sent.as_slice() else {
        eyre::bail!("expected one mail, got {sent:?}");
    };
    eyre::ensure!(
        mail.to == vec!["jack@example.com".to_owned()],
        "unexpected recipients {:?}",
        mail.to
    );
    eyre::ensure!(
        mail.subject == "[foobar] #1 Crash on save",
        "unexpected subject {}",
        mail.subject
    );
    eyre::ensure!(
        mail.body.contains("status: New -> Fixed"),
        "body lacks the status change: {}",
        mail.body
    );

    let history = app
        .tasks
        .revisions(&joe_principal, foobar.id(), task.number())
        .await?;
    eyre::ensure!(history.len() == 2, "expected two revisions");
    let diff = app
        .tasks
        .diff_revisions(&joe_principal, foobar.id(), task.number(), 0, 1)
        .await?;
    eyre::ensure!(diff == edit.changes, "revision diff differs from the edit");

    let verbs: Vec<_> = app
        .actions
        .list_for_project(foobar.id())
        .await?
        .iter()
        .map(|action| action.verb())
        .collect();
    eyre::ensure!(
        verbs
            == vec![
                ActionVerb::Created,
                ActionVerb::AddedMember,
                ActionVerb::CreatedTask,
                ActionVerb::ChangedTask,
            ],
        "unexpected activity {verbs:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn narrowed_workflow_blocks_status_changes(app: App) -> Result<(), eyre::Report> {
    let joe = app.user("joe")?;
    let principal = Principal::from(joe.clone());
    let foobar = app.project(&joe, "foobar").await?;
    let new = app.status(&foobar, "New").await?;
    let assigned = app.status(&foobar, "Assigned").await?;
    let fixed = app.status(&foobar, "Fixed").await?;
    app.workflow_service
        .set_destinations(&principal, foobar.id(), new, BTreeSet::from([assigned]))
        .await?;
    let task = app
        .tasks
        .create_task(&principal, CreateTaskRequest::new(foobar.id(), "Typo"))
        .await?;

    let blocked = app
        .tasks
        .edit_task(
            &principal,
            foobar.id(),
            task.number(),
            TaskFields {
                status: fixed,
                ..task.fields().clone()
            },
            None,
        )
        .await;
    eyre::ensure!(
        matches!(
            blocked,
            Err(TaskServiceError::Domain(
                TrackerDomainError::IllegalStatusChange { .. }
            ))
        ),
        "expected an illegal status change, got {blocked:?}"
    );

    let allowed = app
        .tasks
        .edit_task(
            &principal,
            foobar.id(),
            task.number(),
            TaskFields {
                status: assigned,
                ..task.fields().clone()
            },
            None,
        )
        .await?;
    eyre::ensure!(allowed.task.fields().status == assigned, "status not saved");
    Ok(())
}
