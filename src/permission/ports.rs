//! Storage port for permission grants.

use super::domain::{Grantee, ProjectPermission};
use crate::project::domain::ProjectId;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for permission repository operations.
pub type PermissionRepositoryResult<T> = Result<T, PermissionRepositoryError>;

/// Persistence contract for per-project grants.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Grants `permissions` to `grantee`, returning how many were new.
    async fn grant(
        &self,
        project: ProjectId,
        grantee: Grantee,
        permissions: &[ProjectPermission],
    ) -> PermissionRepositoryResult<usize>;

    /// Revokes `permissions` from `grantee`, returning how many were held.
    async fn revoke(
        &self,
        project: ProjectId,
        grantee: Grantee,
        permissions: &[ProjectPermission],
    ) -> PermissionRepositoryResult<usize>;

    /// Revokes every permission `grantee` holds on `project`.
    async fn revoke_all(&self, project: ProjectId, grantee: Grantee)
    -> PermissionRepositoryResult<usize>;

    /// Returns the permissions granted directly to `grantee`.
    async fn grants_for(
        &self,
        project: ProjectId,
        grantee: Grantee,
    ) -> PermissionRepositoryResult<BTreeSet<ProjectPermission>>;
}

/// Errors returned by permission repositories.
#[derive(Debug, Clone, Error)]
pub enum PermissionRepositoryError {
    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PermissionRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
