//! Fork eligibility rules.

use super::{ForkError, Project};
use crate::accounts::{Principal, User};

/// Checks that `principal` is an active user, the part of the fork rules
/// that does not depend on the project.
///
/// # Errors
///
/// Returns [`ForkError::Anonymous`] or [`ForkError::InactiveUser`].
pub fn ensure_fork_principal(principal: &Principal) -> Result<&User, ForkError> {
    let user = principal.user().ok_or(ForkError::Anonymous)?;
    if !user.is_active() {
        return Err(ForkError::InactiveUser(user.username().clone()));
    }
    Ok(user)
}

/// Checks whether `principal` may fork `project`.
///
/// `tree` holds every project sharing the original's root (the root
/// included). Returns the forking user on success.
///
/// # Errors
///
/// Returns [`ForkError::Anonymous`], [`ForkError::InactiveUser`],
/// [`ForkError::OwnProject`] or [`ForkError::AlreadyForked`].
pub fn ensure_can_fork<'a>(
    project: &Project,
    principal: &'a Principal,
    tree: &[Project],
) -> Result<&'a User, ForkError> {
    let user = ensure_fork_principal(principal)?;
    if project.author() == user.id() {
        return Err(ForkError::OwnProject(user.username().clone()));
    }
    if tree.iter().any(|node| node.author() == user.id()) {
        return Err(ForkError::AlreadyForked {
            user: user.username().clone(),
            root: project.root(),
        });
    }
    Ok(user)
}
