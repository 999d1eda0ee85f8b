//! In-memory repository for tasks and their revisions.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::accounts::UserId;
use crate::project::domain::ProjectId;
use crate::tracker::{
    domain::{StatusId, Task, TaskDraft, TaskNumber, TaskPk, TaskRevision},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskPk, Task>,
    revisions: HashMap<TaskPk, Vec<TaskRevision>>,
    watchers: HashMap<TaskPk, BTreeSet<UserId>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, draft: TaskDraft) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let project = draft.project_id();
        let highest = state
            .tasks
            .values()
            .filter(|task| task.project_id() == project)
            .map(Task::number)
            .max();
        let number = TaskNumber::next_after(highest).map_err(TaskRepositoryError::persistence)?;
        let task = draft.into_task(number);
        state
            .revisions
            .insert(task.pk(), vec![task.initial_revision()]);
        state.tasks.insert(task.pk(), task.clone());
        Ok(task)
    }

    async fn save_revision(
        &self,
        task: &Task,
        revision: &TaskRevision,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get(&task.pk())
            .ok_or(TaskRepositoryError::NotFound(task.pk()))?;
        let expected = revision.revision.saturating_sub(1);
        if revision.revision == 0 || stored.revision() != expected {
            return Err(TaskRepositoryError::RevisionConflict {
                task: task.pk(),
                expected,
                found: stored.revision(),
            });
        }
        state.tasks.insert(task.pk(), task.clone());
        state
            .revisions
            .entry(task.pk())
            .or_default()
            .push(revision.clone());
        Ok(())
    }

    async fn find_by_pk(&self, pk: TaskPk) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&pk).cloned())
    }

    async fn find_by_number(
        &self,
        project: ProjectId,
        number: TaskNumber,
    ) -> TaskRepositoryResult<Option<Task>> {
        Ok(self
            .read()?
            .tasks
            .values()
            .find(|task| task.project_id() == project && task.number() == number)
            .cloned())
    }

    async fn list_for_project(&self, project: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .read()?
            .tasks
            .values()
            .filter(|task| task.project_id() == project)
            .cloned()
            .collect();
        tasks.sort_by_key(Task::number);
        Ok(tasks)
    }

    async fn list_revisions(&self, pk: TaskPk) -> TaskRepositoryResult<Vec<TaskRevision>> {
        Ok(self
            .read()?
            .revisions
            .get(&pk)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_watcher(&self, pk: TaskPk, user: UserId) -> TaskRepositoryResult<bool> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&pk) {
            return Err(TaskRepositoryError::NotFound(pk));
        }
        Ok(state.watchers.entry(pk).or_default().insert(user))
    }

    async fn remove_watcher(&self, pk: TaskPk, user: UserId) -> TaskRepositoryResult<bool> {
        Ok(self
            .write()?
            .watchers
            .get_mut(&pk)
            .is_some_and(|watchers| watchers.remove(&user)))
    }

    async fn count_in_status(&self, status: StatusId) -> TaskRepositoryResult<usize> {
        Ok(self
            .read()?
            .tasks
            .values()
            .filter(|task| task.fields().status == status)
            .count())
    }

    async fn list_watchers(&self, pk: TaskPk) -> TaskRepositoryResult<Vec<UserId>> {
        Ok(self
            .read()?
            .watchers
            .get(&pk)
            .map(|watchers| watchers.iter().copied().collect())
            .unwrap_or_default())
    }
}
