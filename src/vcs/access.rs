//! Pull/push authorization for project repositories.

use super::domain::{RepositoryRef, VcsOperation};
use crate::accounts::Principal;
use crate::permission::{Authorizer, PermissionError, ProjectPermission};
use crate::project::domain::{Project, ProjectId};
use thiserror::Error;
use tracing::debug;

/// Errors raised while authorizing repository access.
#[derive(Debug, Error)]
pub enum VcsAccessError {
    /// The project has no repository (setup has not reached it).
    #[error("project {0} has no repository")]
    NoRepository(ProjectId),
    /// The principal lacks the required permission.
    #[error(transparent)]
    Permission(#[from] PermissionError),
}

/// Returns the permission an operation requires.
#[must_use]
pub const fn required_permission(operation: VcsOperation) -> ProjectPermission {
    match operation {
        VcsOperation::Pull => ProjectPermission::ReadRepository,
        VcsOperation::Push => ProjectPermission::WriteRepository,
    }
}

/// Checks that `principal` may run `operation` against the project
/// repository and returns the repository to serve.
///
/// # Errors
///
/// Returns [`VcsAccessError::NoRepository`] when the project has no
/// repository, or [`VcsAccessError::Permission`] when access is denied.
pub async fn authorize<'p, A>(
    authorizer: &A,
    principal: &Principal,
    project: &'p Project,
    operation: VcsOperation,
) -> Result<&'p RepositoryRef, VcsAccessError>
where
    A: Authorizer + ?Sized,
{
    let repository = project
        .repository()
        .ok_or(VcsAccessError::NoRepository(project.id()))?;
    authorizer
        .ensure_permission(principal, project, required_permission(operation))
        .await?;
    debug!(
        project = %project.id(),
        operation = ?operation,
        repository = %repository,
        "repository access granted"
    );
    Ok(repository)
}
