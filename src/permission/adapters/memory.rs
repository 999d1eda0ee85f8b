//! In-memory permission grant storage.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::permission::{
    domain::{Grantee, ProjectPermission},
    ports::{PermissionRepository, PermissionRepositoryError, PermissionRepositoryResult},
};
use crate::project::domain::ProjectId;

type GrantTable = HashMap<(ProjectId, Grantee), BTreeSet<ProjectPermission>>;

/// Thread-safe in-memory permission repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPermissionRepository {
    grants: Arc<RwLock<GrantTable>>,
}

impl InMemoryPermissionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl std::fmt::Display) -> PermissionRepositoryError {
    PermissionRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn grant(
        &self,
        project: ProjectId,
        grantee: Grantee,
        permissions: &[ProjectPermission],
    ) -> PermissionRepositoryResult<usize> {
        let mut grants = self.grants.write().map_err(poisoned)?;
        let held = grants.entry((project, grantee)).or_default();
        Ok(permissions
            .iter()
            .filter(|permission| held.insert(**permission))
            .count())
    }

    async fn revoke(
        &self,
        project: ProjectId,
        grantee: Grantee,
        permissions: &[ProjectPermission],
    ) -> PermissionRepositoryResult<usize> {
        let mut grants = self.grants.write().map_err(poisoned)?;
        let Some(held) = grants.get_mut(&(project, grantee)) else {
            return Ok(0);
        };
        Ok(permissions
            .iter()
            .filter(|permission| held.remove(*permission))
            .count())
    }

    async fn revoke_all(
        &self,
        project: ProjectId,
        grantee: Grantee,
    ) -> PermissionRepositoryResult<usize> {
        let mut grants = self.grants.write().map_err(poisoned)?;
        Ok(grants
            .remove(&(project, grantee))
            .map_or(0, |held| held.len()))
    }

    async fn grants_for(
        &self,
        project: ProjectId,
        grantee: Grantee,
    ) -> PermissionRepositoryResult<BTreeSet<ProjectPermission>> {
        let grants = self.grants.read().map_err(poisoned)?;
        Ok(grants.get(&(project, grantee)).cloned().unwrap_or_default())
    }
}
