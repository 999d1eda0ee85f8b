//! Task repository tests against `PostgreSQL`.

use crate::postgres::helpers::{
    BoxError, PostgresCluster, Seed, TestDatabase, cluster_or_skip, postgres_cluster,
    test_runtime,
};
use mockable::DefaultClock;
use projector::tracker::{
    domain::TaskNumber,
    ports::{TaskRepository, TaskRepositoryError},
};
use rstest::rstest;

#[rstest]
fn tasks_are_numbered_per_project(postgres_cluster: Result<PostgresCluster, BoxError>) {
    let Some(cluster) = cluster_or_skip(postgres_cluster) else {
        return;
    };
    let database = TestDatabase::create(cluster).expect("test database");
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(async {
        let first_seed = Seed::store(&database).await.expect("first seed");
        let second_seed = Seed::store(&database).await.expect("second seed");

        let one = first_seed.create_task(&database, "One").await.expect("create");
        let two = first_seed.create_task(&database, "Two").await.expect("create");
        let other = second_seed
            .create_task(&database, "Elsewhere")
            .await
            .expect("create");

        assert_eq!(one.number(), TaskNumber::FIRST);
        assert_eq!(two.number().value(), 2);
        assert_eq!(other.number(), TaskNumber::FIRST);

        let tasks = database.tasks();
        let found = tasks
            .find_by_number(first_seed.project_id(), two.number())
            .await
            .expect("lookup");
        assert_eq!(found.as_ref().map(|task| task.pk()), Some(two.pk()));

        let history = tasks.list_revisions(one.pk()).await.expect("history");
        let revisions: Vec<u32> = history.iter().map(|revision| revision.revision).collect();
        assert_eq!(revisions, vec![0]);
    });
}

#[rstest]
fn stale_revision_is_rejected(postgres_cluster: Result<PostgresCluster, BoxError>) {
    let Some(cluster) = cluster_or_skip(postgres_cluster) else {
        return;
    };
    let database = TestDatabase::create(cluster).expect("test database");
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(async {
        let seed = Seed::store(&database).await.expect("seed");
        let task = seed.create_task(&database, "Racy").await.expect("create");
        let editor = seed.project.author();

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

        let tasks = database.tasks();
        tasks
            .save_revision(&first_copy, &first_revision)
            .await
            .expect("first save");
        let result = tasks.save_revision(&second_copy, &second_revision).await;

        assert!(
            matches!(
                result,
                Err(TaskRepositoryError::RevisionConflict {
                    expected: 0,
                    found: 1,
                    ..
                })
            ),
            "expected a revision conflict, got {result:?}"
        );
        let history = tasks.list_revisions(first_copy.pk()).await.expect("history");
        assert_eq!(history.len(), 2);
        let stored = tasks
            .find_by_pk(first_copy.pk())
            .await
            .expect("lookup")
            .expect("task exists");
        assert_eq!(stored.revision(), 1);
    });
}

#[rstest]
fn status_counts_follow_edits(postgres_cluster: Result<PostgresCluster, BoxError>) {
    let Some(cluster) = cluster_or_skip(postgres_cluster) else {
        return;
    };
    let database = TestDatabase::create(cluster).expect("test database");
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(async {
        let seed = Seed::store(&database).await.expect("seed");
        let mut task = seed.create_task(&database, "Count me").await.expect("create");
        seed.create_task(&database, "Stay").await.expect("create");
        let tasks = database.tasks();

        assert_eq!(tasks.count_in_status(seed.new.id).await.expect("count"), 2);
        assert_eq!(tasks.count_in_status(seed.fixed.id).await.expect("count"), 0);

        let mut fields = task.fields().clone();
        fields.status = seed.fixed.id;
        let revision = task.apply_edit(fields, None, seed.project.author(), &DefaultClock);
        tasks.save_revision(&task, &revision).await.expect("save");

        assert_eq!(tasks.count_in_status(seed.new.id).await.expect("count"), 1);
        assert_eq!(tasks.count_in_status(seed.fixed.id).await.expect("count"), 1);
    });
}
