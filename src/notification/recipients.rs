//! Who hears about a task change.

use crate::accounts::{User, UserDirectory, UserDirectoryError, UserId};
use crate::project::domain::Project;
use crate::project::ports::{ProjectRepository, ProjectRepositoryError};
use crate::tracker::domain::Task;
use crate::tracker::ports::{TaskRepository, TaskRepositoryError};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while collecting recipients.
#[derive(Debug, Error)]
pub enum RecipientError {
    /// Watcher lookup failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
    /// Membership lookup failed.
    #[error(transparent)]
    Projects(#[from] ProjectRepositoryError),
    /// User or group lookup failed.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
}

/// Collects notification candidates for a task.
///
/// Explicit watchers are always candidates. On private projects, members
/// and the members of every team group are candidates too.
#[derive(Clone)]
pub struct RecipientResolver<T, P, D>
where
    T: TaskRepository,
    P: ProjectRepository,
    D: UserDirectory,
{
    tasks: Arc<T>,
    projects: Arc<P>,
    directory: Arc<D>,
}

impl<T, P, D> RecipientResolver<T, P, D>
where
    T: TaskRepository,
    P: ProjectRepository,
    D: UserDirectory,
{
    /// Creates a resolver.
    #[must_use]
    pub const fn new(tasks: Arc<T>, projects: Arc<P>, directory: Arc<D>) -> Self {
        Self {
            tasks,
            projects,
            directory,
        }
    }

    /// Returns every candidate user id for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`RecipientError`] when a lookup fails.
    pub async fn candidates(
        &self,
        project: &Project,
        task: &Task,
    ) -> Result<BTreeSet<UserId>, RecipientError> {
        let mut candidates: BTreeSet<UserId> =
            self.tasks.list_watchers(task.pk()).await?.into_iter().collect();
        if project.is_public() {
            return Ok(candidates);
        }

        candidates.extend(
            self.projects
                .list_memberships(project.id())
                .await?
                .into_iter()
                .map(|membership| membership.user_id),
        );
        for team in self.projects.list_teams(project.id()).await? {
            candidates.extend(self.directory.members_of(team.group_id).await?);
        }
        Ok(candidates)
    }

    /// Returns the active candidates with an email address, excluding
    /// `editor`.
    ///
    /// # Errors
    ///
    /// Returns [`RecipientError`] when a lookup fails.
    pub async fn recipients(
        &self,
        project: &Project,
        task: &Task,
        editor: UserId,
    ) -> Result<Vec<User>, RecipientError> {
        let mut users = Vec::new();
        for id in self.candidates(project, task).await? {
            if id == editor {
                continue;
            }
            let Some(user) = self.directory.find_user(id).await? else {
                continue;
            };
            if user.is_active() && user.email().is_some() {
                users.push(user);
            }
        }
        Ok(users)
    }
}
