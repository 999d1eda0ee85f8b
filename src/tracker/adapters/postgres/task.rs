//! `PostgreSQL` repository for tasks, revisions and watchers.

use super::{
    models::{TaskRevisionRow, TaskRow, TaskWatcherRow},
    schema::{task_revisions, task_watchers, tasks},
};
use crate::accounts::UserId;
use crate::persistence::PgPool;
use crate::project::domain::ProjectId;
use crate::tracker::{
    domain::{
        ComponentId, LabelId, MilestoneId, PersistedTaskData, StatusId, Task, TaskDraft,
        TaskFields, TaskNumber, TaskPk, TaskRevision,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::dsl::max;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Attempts made to claim a task number before giving up.
const NUMBER_CLAIM_ATTEMPTS: usize = 5;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, draft: TaskDraft) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            for attempt in 1..=NUMBER_CLAIM_ATTEMPTS {
                match insert_numbered(connection, draft.clone()) {
                    Ok(task) => return Ok(task),
                    Err(TxError::NumberTaken) => {
                        debug!(attempt, project = %draft.project_id(), "task number taken, retrying");
                    }
                    Err(TxError::Repository(err)) => return Err(err),
                }
            }
            Err(TaskRepositoryError::persistence(std::io::Error::other(
                "could not claim a task number",
            )))
        })
        .await
    }

    async fn save_revision(
        &self,
        task: &Task,
        revision: &TaskRevision,
    ) -> TaskRepositoryResult<()> {
        let task_row = task_to_row(task)?;
        let revision_row = revision_to_row(revision)?;
        let pk = task.pk();
        let expected = revision.revision.saturating_sub(1);
        let expected_column = i32::try_from(expected).map_err(TaskRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, TxError, _>(|tx| {
                    let updated = diesel::update(
                        tasks::table
                            .filter(tasks::pk.eq(task_row.pk))
                            .filter(tasks::revision.eq(expected_column)),
                    )
                    .set(&task_row)
                    .execute(tx)?;

                    if updated == 0 {
                        let found = tasks::table
                            .filter(tasks::pk.eq(task_row.pk))
                            .select(tasks::revision)
                            .first::<i32>(tx)
                            .optional()?;
                        return Err(TxError::Repository(match found {
                            None => TaskRepositoryError::NotFound(pk),
                            Some(stored) => TaskRepositoryError::RevisionConflict {
                                task: pk,
                                expected,
                                found: u32::try_from(stored).unwrap_or_default(),
                            },
                        }));
                    }

                    diesel::insert_into(task_revisions::table)
                        .values(&revision_row)
                        .execute(tx)?;
                    Ok(())
                })
                .map_err(TxError::into_repository_error)
        })
        .await
    }

    async fn find_by_pk(&self, pk: TaskPk) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::pk.eq(pk.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_number(
        &self,
        project: ProjectId,
        number: TaskNumber,
    ) -> TaskRepositoryResult<Option<Task>> {
        let number_column =
            i64::try_from(number.value()).map_err(TaskRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::project_id.eq(project.into_inner()))
                .filter(tasks::number.eq(number_column))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_for_project(&self, project: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::project_id.eq(project.into_inner()))
                .order(tasks::number.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_revisions(&self, pk: TaskPk) -> TaskRepositoryResult<Vec<TaskRevision>> {
        self.run_blocking(move |connection| {
            let rows = task_revisions::table
                .filter(task_revisions::task_pk.eq(pk.into_inner()))
                .order(task_revisions::revision.asc())
                .select(TaskRevisionRow::as_select())
                .load::<TaskRevisionRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_revision).collect()
        })
        .await
    }

    async fn add_watcher(&self, pk: TaskPk, user: UserId) -> TaskRepositoryResult<bool> {
        let row = TaskWatcherRow {
            task_pk: pk.into_inner(),
            user_id: user.into_inner(),
        };
        self.run_blocking(move |connection| {
            let inserted = diesel::insert_into(task_watchers::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TaskRepositoryError::NotFound(pk)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(inserted > 0)
        })
        .await
    }

    async fn remove_watcher(&self, pk: TaskPk, user: UserId) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(
                task_watchers::table
                    .filter(task_watchers::task_pk.eq(pk.into_inner()))
                    .filter(task_watchers::user_id.eq(user.into_inner())),
            )
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn count_in_status(&self, status: StatusId) -> TaskRepositoryResult<usize> {
        self.run_blocking(move |connection| {
            let count = tasks::table
                .filter(tasks::status_id.eq(status.into_inner()))
                .count()
                .get_result::<i64>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            usize::try_from(count).map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn list_watchers(&self, pk: TaskPk) -> TaskRepositoryResult<Vec<UserId>> {
        self.run_blocking(move |connection| {
            let users = task_watchers::table
                .filter(task_watchers::task_pk.eq(pk.into_inner()))
                .order(task_watchers::user_id.asc())
                .select(task_watchers::user_id)
                .load::<uuid::Uuid>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(users.into_iter().map(UserId::from_uuid).collect())
        })
        .await
    }
}

enum TxError {
    NumberTaken,
    Repository(TaskRepositoryError),
}

impl TxError {
    fn into_repository_error(self) -> TaskRepositoryError {
        match self {
            Self::NumberTaken => TaskRepositoryError::persistence(std::io::Error::other(
                "task number already taken",
            )),
            Self::Repository(err) => err,
        }
    }
}

impl From<DieselError> for TxError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                if is_number_unique_violation(info.as_ref()) =>
            {
                Self::NumberTaken
            }
            _ => Self::Repository(TaskRepositoryError::persistence(err)),
        }
    }
}

impl From<TaskRepositoryError> for TxError {
    fn from(err: TaskRepositoryError) -> Self {
        Self::Repository(err)
    }
}

fn insert_numbered(connection: &mut PgConnection, draft: TaskDraft) -> Result<Task, TxError> {
    connection.transaction::<_, TxError, _>(|tx| {
        let stored_max = tasks::table
            .filter(tasks::project_id.eq(draft.project_id().into_inner()))
            .select(max(tasks::number))
            .first::<Option<i64>>(tx)?;
        let highest = stored_max
            .map(|value| {
                u64::try_from(value)
                    .map_err(TaskRepositoryError::persistence)
                    .and_then(|raw| {
                        TaskNumber::new(raw).map_err(TaskRepositoryError::persistence)
                    })
            })
            .transpose()?;
        let number = TaskNumber::next_after(highest).map_err(TaskRepositoryError::persistence)?;
        let task = draft.into_task(number);

        diesel::insert_into(tasks::table)
            .values(&task_to_row(&task)?)
            .execute(tx)?;
        diesel::insert_into(task_revisions::table)
            .values(&revision_to_row(&task.initial_revision())?)
            .execute(tx)?;
        Ok(task)
    })
}

fn task_to_row(task: &Task) -> TaskRepositoryResult<TaskRow> {
    let fields = task.fields();
    Ok(TaskRow {
        pk: task.pk().into_inner(),
        project_id: task.project_id().into_inner(),
        number: i64::try_from(task.number().value()).map_err(TaskRepositoryError::persistence)?,
        summary: fields.summary.clone(),
        description: fields.description.clone(),
        status_id: fields.status.into_inner(),
        component_id: fields.component.into_inner(),
        deadline: fields.deadline,
        milestone_id: fields.milestone.map(MilestoneId::into_inner),
        owner_id: fields.owner.map(UserId::into_inner),
        priority_id: fields.priority.into_inner(),
        task_type_id: fields.task_type.into_inner(),
        author_id: task.author().into_inner(),
        editor_id: task.editor().into_inner(),
        revision: i32::try_from(task.revision()).map_err(TaskRepositoryError::persistence)?,
        created_at: task.created_at(),
        edited_at: task.edited_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        pk,
        project_id,
        number,
        summary,
        description,
        status_id,
        component_id,
        deadline,
        milestone_id,
        owner_id,
        priority_id,
        task_type_id,
        author_id,
        editor_id,
        revision,
        created_at,
        edited_at,
    } = row;

    let raw_number = u64::try_from(number).map_err(TaskRepositoryError::persistence)?;
    let data = PersistedTaskData {
        pk: TaskPk::from_uuid(pk),
        project_id: ProjectId::from_uuid(project_id),
        number: TaskNumber::new(raw_number).map_err(TaskRepositoryError::persistence)?,
        fields: TaskFields {
            summary,
            description,
            status: StatusId::from_uuid(status_id),
            component: ComponentId::from_uuid(component_id),
            deadline,
            milestone: milestone_id.map(MilestoneId::from_uuid),
            owner: owner_id.map(UserId::from_uuid),
            priority: LabelId::from_uuid(priority_id),
            task_type: LabelId::from_uuid(task_type_id),
        },
        author: UserId::from_uuid(author_id),
        editor: UserId::from_uuid(editor_id),
        revision: u32::try_from(revision).map_err(TaskRepositoryError::persistence)?,
        created_at,
        edited_at,
    };
    Ok(Task::from_persisted(data))
}

fn revision_to_row(revision: &TaskRevision) -> TaskRepositoryResult<TaskRevisionRow> {
    Ok(TaskRevisionRow {
        task_pk: revision.task_pk.into_inner(),
        revision: i32::try_from(revision.revision).map_err(TaskRepositoryError::persistence)?,
        fields: serde_json::to_value(&revision.fields)
            .map_err(TaskRepositoryError::persistence)?,
        comment: revision.comment.clone(),
        editor_id: revision.editor.into_inner(),
        created_at: revision.created_at,
    })
}

fn row_to_revision(row: TaskRevisionRow) -> TaskRepositoryResult<TaskRevision> {
    Ok(TaskRevision {
        task_pk: TaskPk::from_uuid(row.task_pk),
        revision: u32::try_from(row.revision).map_err(TaskRepositoryError::persistence)?,
        fields: serde_json::from_value(row.fields).map_err(TaskRepositoryError::persistence)?,
        comment: row.comment,
        editor: UserId::from_uuid(row.editor_id),
        created_at: row.created_at,
    })
}

fn is_number_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_tasks_project_number")
}
