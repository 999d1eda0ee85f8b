//! In-memory user directory for tests and embedded deployments.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::accounts::{
    domain::{GroupId, User, UserId},
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};

/// Thread-safe in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashMap<UserId, User>,
    groups: HashMap<GroupId, BTreeSet<UserId>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user account.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::Backend`] when the lock is poisoned.
    pub fn insert_user(&self, user: User) -> UserDirectoryResult<()> {
        let mut state = self.write()?;
        state.users.insert(user.id(), user);
        Ok(())
    }

    /// Adds a user to a group, creating the group when needed.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::Backend`] when the lock is poisoned.
    pub fn add_to_group(&self, group: GroupId, user: UserId) -> UserDirectoryResult<()> {
        let mut state = self.write()?;
        state.groups.entry(group).or_default().insert(user);
        Ok(())
    }

    fn write(&self) -> UserDirectoryResult<std::sync::RwLockWriteGuard<'_, DirectoryState>> {
        self.state
            .write()
            .map_err(|err| UserDirectoryError::backend(std::io::Error::other(err.to_string())))
    }

    fn read(&self) -> UserDirectoryResult<std::sync::RwLockReadGuard<'_, DirectoryState>> {
        self.state
            .read()
            .map_err(|err| UserDirectoryError::backend(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, id: UserId) -> UserDirectoryResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn groups_of(&self, id: UserId) -> UserDirectoryResult<Vec<GroupId>> {
        let state = self.read()?;
        let mut groups: Vec<GroupId> = state
            .groups
            .iter()
            .filter(|(_, members)| members.contains(&id))
            .map(|(group, _)| *group)
            .collect();
        groups.sort();
        Ok(groups)
    }

    async fn members_of(&self, group: GroupId) -> UserDirectoryResult<Vec<UserId>> {
        let state = self.read()?;
        Ok(state
            .groups
            .get(&group)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default())
    }
}
