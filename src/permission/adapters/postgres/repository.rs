//! `PostgreSQL` repository for permission grants.

use super::{models::GrantRow, schema::permission_grants};
use crate::permission::{
    domain::{Grantee, ProjectPermission},
    ports::{PermissionRepository, PermissionRepositoryError, PermissionRepositoryResult},
};
use crate::persistence::PgPool;
use crate::project::domain::ProjectId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::collections::BTreeSet;

/// `PostgreSQL`-backed permission repository.
#[derive(Debug, Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> PermissionRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PermissionRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(PermissionRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(PermissionRepositoryError::persistence)?
    }
}

const fn grantee_columns(grantee: Grantee) -> (&'static str, uuid::Uuid) {
    match grantee {
        Grantee::User(id) => ("user", id.into_inner()),
        Grantee::Group(id) => ("group", id.into_inner()),
    }
}

fn codenames(permissions: &[ProjectPermission]) -> Vec<String> {
    permissions
        .iter()
        .map(|permission| permission.as_str().to_owned())
        .collect()
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn grant(
        &self,
        project: ProjectId,
        grantee: Grantee,
        permissions: &[ProjectPermission],
    ) -> PermissionRepositoryResult<usize> {
        let (kind, grantee_id) = grantee_columns(grantee);
        let rows: Vec<GrantRow> = permissions
            .iter()
            .map(|permission| GrantRow {
                project_id: project.into_inner(),
                grantee_kind: kind.to_owned(),
                grantee_id,
                permission: permission.as_str().to_owned(),
            })
            .collect();
        self.run_blocking(move |connection| {
            diesel::insert_into(permission_grants::table)
                .values(&rows)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(PermissionRepositoryError::persistence)
        })
        .await
    }

    async fn revoke(
        &self,
        project: ProjectId,
        grantee: Grantee,
        permissions: &[ProjectPermission],
    ) -> PermissionRepositoryResult<usize> {
        let (kind, grantee_id) = grantee_columns(grantee);
        let names = codenames(permissions);
        self.run_blocking(move |connection| {
            diesel::delete(
                permission_grants::table
                    .filter(permission_grants::project_id.eq(project.into_inner()))
                    .filter(permission_grants::grantee_kind.eq(kind))
                    .filter(permission_grants::grantee_id.eq(grantee_id))
                    .filter(permission_grants::permission.eq_any(names)),
            )
            .execute(connection)
            .map_err(PermissionRepositoryError::persistence)
        })
        .await
    }

    async fn revoke_all(
        &self,
        project: ProjectId,
        grantee: Grantee,
    ) -> PermissionRepositoryResult<usize> {
        let (kind, grantee_id) = grantee_columns(grantee);
        self.run_blocking(move |connection| {
            diesel::delete(
                permission_grants::table
                    .filter(permission_grants::project_id.eq(project.into_inner()))
                    .filter(permission_grants::grantee_kind.eq(kind))
                    .filter(permission_grants::grantee_id.eq(grantee_id)),
            )
            .execute(connection)
            .map_err(PermissionRepositoryError::persistence)
        })
        .await
    }

    async fn grants_for(
        &self,
        project: ProjectId,
        grantee: Grantee,
    ) -> PermissionRepositoryResult<BTreeSet<ProjectPermission>> {
        let (kind, grantee_id) = grantee_columns(grantee);
        self.run_blocking(move |connection| {
            let names = permission_grants::table
                .filter(permission_grants::project_id.eq(project.into_inner()))
                .filter(permission_grants::grantee_kind.eq(kind))
                .filter(permission_grants::grantee_id.eq(grantee_id))
                .select(permission_grants::permission)
                .load::<String>(connection)
                .map_err(PermissionRepositoryError::persistence)?;
            names
                .iter()
                .map(|name| {
                    ProjectPermission::try_from(name.as_str())
                        .map_err(PermissionRepositoryError::persistence)
                })
                .collect()
        })
        .await
    }
}
