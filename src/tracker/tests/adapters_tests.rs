//! In-memory adapter tests for task numbering, revisions and workflow
//! uniqueness.

use crate::accounts::UserId;
use crate::project::domain::ProjectId;
use crate::tracker::{
    adapters::memory::{InMemoryTaskRepository, InMemoryWorkflowRepository},
    domain::{
        ComponentId, LabelId, Status, StatusGraph, StatusId, TaskDraft, TaskFields, TaskNumber,
        Transition,
    },
    ports::{TaskRepository, TaskRepositoryError, WorkflowRepository, WorkflowRepositoryError},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn tasks() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

#[fixture]
fn workflow() -> InMemoryWorkflowRepository {
    InMemoryWorkflowRepository::new()
}

fn draft(project: ProjectId, summary: &str) -> TaskDraft {
    let fields = TaskFields {
        summary: summary.to_owned(),
        description: String::new(),
        status: StatusId::new(),
        component: ComponentId::new(),
        deadline: None,
        milestone: None,
        owner: None,
        priority: LabelId::new(),
        task_type: LabelId::new(),
    };
    TaskDraft::new(project, fields, UserId::new(), &DefaultClock).expect("valid draft")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_numbers_are_sequential_per_project(tasks: InMemoryTaskRepository) {
    let (first_project, second_project) = (ProjectId::new(), ProjectId::new());

    let first = tasks
        .create(draft(first_project, "One"))
        .await
        .expect("create should succeed");
    let second = tasks
        .create(draft(first_project, "Two"))
        .await
        .expect("create should succeed");
    let other = tasks
        .create(draft(second_project, "Elsewhere"))
        .await
        .expect("create should succeed");

    assert_eq!(first.number(), TaskNumber::FIRST);
    assert_eq!(second.number().value(), 2);
    assert_eq!(other.number(), TaskNumber::FIRST);
    let found = tasks
        .find_by_number(first_project, second.number())
        .await
        .expect("lookup should succeed");
    assert_eq!(found, Some(second));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_stores_initial_revision(tasks: InMemoryTaskRepository) {
    let task = tasks
        .create(draft(ProjectId::new(), "One"))
        .await
        .expect("create should succeed");

    let history = tasks
        .list_revisions(task.pk())
        .await
        .expect("history should load");

    let [initial] = history.as_slice() else {
        panic!("expected exactly one revision, got {}", history.len());
    };
    assert_eq!(initial.revision, 0);
    assert_eq!(&initial.fields, task.fields());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_revision_is_rejected(tasks: InMemoryTaskRepository) {
    let task = tasks
        .create(draft(ProjectId::new(), "One"))
        .await
        .expect("create should succeed");
    let editor = UserId::new();

    let mut first_copy = task.clone();
    let mut second_copy = task;
    let first_revision =
        first_copy.apply_edit(first_copy.fields().clone(), None, editor, &DefaultClock);
    let second_revision = second_copy.apply_edit(
        second_copy.fields().clone(),
        Some("late".to_owned()),
        editor,
        &DefaultClock,
    );

    tasks
        .save_revision(&first_copy, &first_revision)
        .await
        .expect("first save should succeed");
    let result = tasks.save_revision(&second_copy, &second_revision).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::RevisionConflict {
            expected: 0,
            found: 1,
            ..
        })
    ));
    let history = tasks
        .list_revisions(first_copy.pk())
        .await
        .expect("history should load");
    assert_eq!(history.len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn watchers_are_a_set(tasks: InMemoryTaskRepository) {
    let task = tasks
        .create(draft(ProjectId::new(), "One"))
        .await
        .expect("create should succeed");
    let user = UserId::new();

    assert!(tasks.add_watcher(task.pk(), user).await.expect("add"));
    assert!(!tasks.add_watcher(task.pk(), user).await.expect("add again"));
    assert_eq!(
        tasks.list_watchers(task.pk()).await.expect("list"),
        vec![user]
    );
    assert!(tasks.remove_watcher(task.pk(), user).await.expect("remove"));
    assert!(tasks
        .list_watchers(task.pk())
        .await
        .expect("list")
        .is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_names_are_unique_per_project(workflow: InMemoryWorkflowRepository) {
    let project = ProjectId::new();
    let open = Status::new(project, "Open", 1, false, true).expect("valid status");
    let clash = Status::new(project, " open ", 2, false, false).expect("valid status");
    let elsewhere = Status::new(ProjectId::new(), "Open", 1, false, true).expect("valid status");

    workflow.insert_status(&open).await.expect("insert");
    let result = workflow.insert_status(&clash).await;
    workflow
        .insert_status(&elsewhere)
        .await
        .expect("same name in another project is allowed");

    assert!(matches!(
        result,
        Err(WorkflowRepositoryError::DuplicateName {
            entity: "status",
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_status_drops_its_transitions(workflow: InMemoryWorkflowRepository) {
    let project = ProjectId::new();
    let new = Status::new(project, "New", 1, false, true).expect("valid status");
    let fixed = Status::new(project, "Fixed", 2, true, false).expect("valid status");
    let statuses = vec![new.clone(), fixed.clone()];
    for status in &statuses {
        workflow.insert_status(status).await.expect("insert");
    }
    for transition in StatusGraph::complete(&statuses) {
        assert!(workflow.insert_transition(transition).await.expect("insert"));
    }

    assert!(workflow.delete_status(fixed.id).await.expect("delete"));

    let remaining = workflow
        .list_transitions(project)
        .await
        .expect("list should succeed");
    assert_eq!(
        remaining,
        vec![Transition::new(new.id, new.id)]
    );
    assert!(!workflow.delete_status(fixed.id).await.expect("delete"));
}
