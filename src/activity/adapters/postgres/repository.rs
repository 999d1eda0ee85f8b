//! `PostgreSQL` repository for the activity log.

use super::{models::ActionRow, schema::actions};
use crate::accounts::UserId;
use crate::activity::{
    domain::{Action, ActionId, ActionTarget, ActionVerb, PersistedActionData, TargetKind},
    ports::{ActionRepository, ActionRepositoryError, ActionRepositoryResult},
};
use crate::persistence::PgPool;
use crate::project::domain::ProjectId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed action log.
#[derive(Debug, Clone)]
pub struct PostgresActionRepository {
    pool: PgPool,
}

impl PostgresActionRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ActionRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ActionRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ActionRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ActionRepositoryError::persistence)?
    }
}

#[async_trait]
impl ActionRepository for PostgresActionRepository {
    async fn record(&self, action: &Action) -> ActionRepositoryResult<()> {
        let row = to_row(action);
        self.run_blocking(move |connection| {
            diesel::insert_into(actions::table)
                .values(&row)
                .execute(connection)
                .map_err(ActionRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn list_for_project(&self, project: ProjectId) -> ActionRepositoryResult<Vec<Action>> {
        self.run_blocking(move |connection| {
            let rows = actions::table
                .filter(actions::project_id.eq(project.into_inner()))
                .order(actions::created_at.asc())
                .select(ActionRow::as_select())
                .load::<ActionRow>(connection)
                .map_err(ActionRepositoryError::persistence)?;
            rows.into_iter().map(row_to_action).collect()
        })
        .await
    }

    async fn list_public(&self, limit: usize) -> ActionRepositoryResult<Vec<Action>> {
        let limit = i64::try_from(limit).map_err(ActionRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let rows = actions::table
                .filter(actions::is_public.eq(true))
                .order(actions::created_at.desc())
                .limit(limit)
                .select(ActionRow::as_select())
                .load::<ActionRow>(connection)
                .map_err(ActionRepositoryError::persistence)?;
            rows.into_iter().map(row_to_action).collect()
        })
        .await
    }
}

fn to_row(action: &Action) -> ActionRow {
    let target = action.target();
    ActionRow {
        id: action.id().into_inner(),
        project_id: action.project_id().into_inner(),
        actor_id: action.actor().map(UserId::into_inner),
        verb: action.verb().as_str().to_owned(),
        target_kind: target.map(|link| link.kind.as_str().to_owned()),
        target_id: target.map(|link| link.id),
        created_at: action.created_at(),
        is_public: action.is_public(),
    }
}

fn row_to_action(row: ActionRow) -> ActionRepositoryResult<Action> {
    let verb = ActionVerb::try_from(row.verb.as_str()).map_err(ActionRepositoryError::persistence)?;
    let target = match (row.target_kind, row.target_id) {
        (Some(kind), Some(id)) => Some(ActionTarget::new(
            TargetKind::try_from(kind.as_str()).map_err(ActionRepositoryError::persistence)?,
            id,
        )),
        _ => None,
    };
    Ok(Action::from_persisted(PersistedActionData {
        id: ActionId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        actor: row.actor_id.map(UserId::from_uuid),
        verb,
        target,
        created_at: row.created_at,
        is_public: row.is_public,
    }))
}
