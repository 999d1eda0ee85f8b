//! Workflow repository tests against `PostgreSQL`.

use crate::postgres::helpers::{
    BoxError, PostgresCluster, Seed, TestDatabase, cluster_or_skip, postgres_cluster,
    test_runtime,
};
use projector::tracker::{
    domain::{Component, Label, LabelKind, Status, Transition},
    ports::{WorkflowRepository, WorkflowRepositoryError},
};
use rstest::rstest;

#[rstest]
fn name_clashes_map_to_duplicate_name(postgres_cluster: Result<PostgresCluster, BoxError>) {
    let Some(cluster) = cluster_or_skip(postgres_cluster) else {
        return;
    };
    let database = TestDatabase::create(cluster).expect("test database");
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(async {
        let seed = Seed::store(&database).await.expect("seed");
        let other = Seed::store(&database).await.expect("other seed");
        let workflow = database.workflow();
        let project = seed.project_id();

        let status = Status::new(project, "NEW", 5, false, false).expect("valid status");
        let status_result = workflow.insert_status(&status).await;
        assert!(
            matches!(
                &status_result,
                Err(WorkflowRepositoryError::DuplicateName { entity: "status", name, .. })
                    if name == "NEW"
            ),
            "expected a duplicate status, got {status_result:?}"
        );

        let component = Component::new(project, "core").expect("valid component");
        let component_result = workflow.insert_component(&component).await;
        assert!(
            matches!(
                component_result,
                Err(WorkflowRepositoryError::DuplicateName {
                    entity: "component",
                    ..
                })
            ),
            "expected a duplicate component, got {component_result:?}"
        );

        // Labels of another kind share no namespace.
        let type_named_like_priority =
            Label::new(project, LabelKind::TaskType, "Normal", 2).expect("valid label");
        workflow
            .insert_label(&type_named_like_priority)
            .await
            .expect("label of another kind");

        let elsewhere =
            Status::new(other.project_id(), "Brand new", 3, false, false).expect("valid status");
        workflow
            .insert_status(&elsewhere)
            .await
            .expect("unique name in another project");
        let found = workflow
            .find_status_by_name(other.project_id(), " brand NEW ")
            .await
            .expect("lookup");
        assert_eq!(found.map(|stored| stored.id), Some(elsewhere.id));
    });
}

#[rstest]
fn status_used_by_tasks_is_not_deleted(postgres_cluster: Result<PostgresCluster, BoxError>) {
    let Some(cluster) = cluster_or_skip(postgres_cluster) else {
        return;
    };
    let database = TestDatabase::create(cluster).expect("test database");
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(async {
        let seed = Seed::store(&database).await.expect("seed");
        seed.create_task(&database, "Blocker").await.expect("create");
        let workflow = database.workflow();

        let result = workflow.delete_status(seed.new.id).await;

        assert!(
            matches!(result, Err(WorkflowRepositoryError::StatusInUse(id)) if id == seed.new.id),
            "expected the status to be in use, got {result:?}"
        );
        assert!(
            workflow
                .find_status(seed.new.id)
                .await
                .expect("lookup")
                .is_some()
        );
        let transitions = workflow
            .list_transitions(seed.project_id())
            .await
            .expect("transitions");
        assert_eq!(transitions.len(), 4, "the failed delete rolls back");
    });
}

#[rstest]
fn unused_status_is_deleted_with_its_transitions(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) {
    let Some(cluster) = cluster_or_skip(postgres_cluster) else {
        return;
    };
    let database = TestDatabase::create(cluster).expect("test database");
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(async {
        let seed = Seed::store(&database).await.expect("seed");
        seed.create_task(&database, "Stays new").await.expect("create");
        let workflow = database.workflow();

        assert!(workflow.delete_status(seed.fixed.id).await.expect("delete"));
        assert!(!workflow.delete_status(seed.fixed.id).await.expect("second delete"));

        let transitions = workflow
            .list_transitions(seed.project_id())
            .await
            .expect("transitions");
        assert_eq!(transitions, vec![Transition::new(seed.new.id, seed.new.id)]);
    });
}
