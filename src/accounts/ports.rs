//! Port contract for looking up users and group membership.

use super::domain::{GroupId, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory lookups.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Read-only view of the external account store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    async fn find_user(&self, id: UserId) -> UserDirectoryResult<Option<User>>;

    /// Returns the groups the user belongs to.
    async fn groups_of(&self, id: UserId) -> UserDirectoryResult<Vec<GroupId>>;

    /// Returns the users belonging to a group.
    async fn members_of(&self, group: GroupId) -> UserDirectoryResult<Vec<UserId>>;
}

/// Errors returned by user directory implementations.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// Backend failure.
    #[error("user directory error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
