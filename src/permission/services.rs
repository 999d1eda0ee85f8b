//! Authorization decisions over stored grants.

use super::{
    domain::{Grantee, ProjectPermission},
    ports::{PermissionRepository, PermissionRepositoryError},
};
use crate::accounts::{GroupId, Principal, UserDirectory, UserDirectoryError, UserId};
use crate::project::domain::{Project, ProjectId};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while authorizing or managing grants.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// The principal lacks the required permission.
    #[error("permission denied: {permission} on project {project}")]
    PermissionDenied {
        /// Required permission.
        permission: ProjectPermission,
        /// Project the check ran against.
        project: ProjectId,
    },
    /// Grant storage failed.
    #[error(transparent)]
    Repository(#[from] PermissionRepositoryError),
    /// Group lookup failed.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
}

/// Result type for permission operations.
pub type PermissionResult<T> = Result<T, PermissionError>;

/// Answers whether a principal may act on a project.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Returns every permission `principal` holds on `project`.
    async fn permissions_of(
        &self,
        principal: &Principal,
        project: &Project,
    ) -> PermissionResult<BTreeSet<ProjectPermission>>;

    /// Returns `true` when `principal` holds `permission` on `project`.
    async fn has_permission(
        &self,
        principal: &Principal,
        project: &Project,
        permission: ProjectPermission,
    ) -> PermissionResult<bool> {
        Ok(self
            .permissions_of(principal, project)
            .await?
            .contains(&permission))
    }

    /// Fails with [`PermissionError::PermissionDenied`] unless
    /// `principal` holds `permission` on `project`.
    async fn ensure_permission(
        &self,
        principal: &Principal,
        project: &Project,
        permission: ProjectPermission,
    ) -> PermissionResult<()> {
        if self.has_permission(principal, project, permission).await? {
            return Ok(());
        }
        debug!(
            project = %project.id(),
            permission = %permission,
            principal = ?principal.user_id(),
            "permission denied"
        );
        Err(PermissionError::PermissionDenied {
            permission,
            project: project.id(),
        })
    }
}

/// Grant management and authorization over a [`PermissionRepository`].
#[derive(Clone)]
pub struct PermissionService<R, D>
where
    R: PermissionRepository,
    D: UserDirectory,
{
    repository: Arc<R>,
    directory: Arc<D>,
}

impl<R, D> PermissionService<R, D>
where
    R: PermissionRepository,
    D: UserDirectory,
{
    /// Creates a permission service.
    #[must_use]
    pub const fn new(repository: Arc<R>, directory: Arc<D>) -> Self {
        Self {
            repository,
            directory,
        }
    }

    /// Grants the author every project permission.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Repository`] when storage fails.
    pub async fn grant_author(&self, project: ProjectId, author: UserId) -> PermissionResult<()> {
        self.repository
            .grant(project, Grantee::User(author), &ProjectPermission::ALL)
            .await?;
        Ok(())
    }

    /// Grants the default member permission set to a user.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Repository`] when storage fails.
    pub async fn grant_member(&self, project: ProjectId, user: UserId) -> PermissionResult<()> {
        self.repository
            .grant(
                project,
                Grantee::User(user),
                &ProjectPermission::MEMBER_DEFAULTS,
            )
            .await?;
        Ok(())
    }

    /// Grants the default member permission set to a group.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Repository`] when storage fails.
    pub async fn grant_team(&self, project: ProjectId, group: GroupId) -> PermissionResult<()> {
        self.repository
            .grant(
                project,
                Grantee::Group(group),
                &ProjectPermission::MEMBER_DEFAULTS,
            )
            .await?;
        Ok(())
    }

    /// Grants explicit permissions to a grantee.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Repository`] when storage fails.
    pub async fn grant(
        &self,
        project: ProjectId,
        grantee: Grantee,
        permissions: &[ProjectPermission],
    ) -> PermissionResult<usize> {
        Ok(self.repository.grant(project, grantee, permissions).await?)
    }

    /// Revokes explicit permissions from a grantee.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Repository`] when storage fails.
    pub async fn revoke(
        &self,
        project: ProjectId,
        grantee: Grantee,
        permissions: &[ProjectPermission],
    ) -> PermissionResult<usize> {
        Ok(self.repository.revoke(project, grantee, permissions).await?)
    }

    /// Revokes everything a grantee holds on a project.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Repository`] when storage fails.
    pub async fn revoke_all(
        &self,
        project: ProjectId,
        grantee: Grantee,
    ) -> PermissionResult<usize> {
        Ok(self.repository.revoke_all(project, grantee).await?)
    }
}

#[async_trait]
impl<R, D> Authorizer for PermissionService<R, D>
where
    R: PermissionRepository,
    D: UserDirectory,
{
    async fn permissions_of(
        &self,
        principal: &Principal,
        project: &Project,
    ) -> PermissionResult<BTreeSet<ProjectPermission>> {
        if principal.user().is_some_and(|user| user.is_active() && user.is_superuser()) {
            return Ok(ProjectPermission::ALL.into_iter().collect());
        }

        let mut held = BTreeSet::new();
        if project.is_public() {
            held.extend(ProjectPermission::PUBLIC);
        }

        let Some(user) = principal.user().filter(|user| user.is_active()) else {
            return Ok(held);
        };

        held.extend(
            self.repository
                .grants_for(project.id(), Grantee::User(user.id()))
                .await?,
        );
        for group in self.directory.groups_of(user.id()).await? {
            held.extend(
                self.repository
                    .grants_for(project.id(), Grantee::Group(group))
                    .await?,
            );
        }
        Ok(held)
    }
}
