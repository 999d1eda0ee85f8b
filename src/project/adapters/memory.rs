//! In-memory repository for projects and their memberships.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::accounts::{GroupId, UserId};
use crate::project::{
    domain::{Membership, Project, ProjectConfig, ProjectId, ProjectSlug, Team},
    ports::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult},
};

/// Thread-safe in-memory project repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    state: Arc<RwLock<InMemoryProjectState>>,
}

#[derive(Debug, Default)]
struct InMemoryProjectState {
    projects: HashMap<ProjectId, Project>,
    memberships: Vec<Membership>,
    teams: Vec<Team>,
    configs: HashMap<ProjectId, ProjectConfig>,
}

impl InMemoryProjectRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ProjectRepositoryResult<RwLockReadGuard<'_, InMemoryProjectState>> {
        self.state.read().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ProjectRepositoryResult<RwLockWriteGuard<'_, InMemoryProjectState>> {
        self.state.write().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn store(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut state = self.write()?;
        if state.projects.contains_key(&project.id()) {
            return Err(ProjectRepositoryError::DuplicateProject(project.id()));
        }
        let name_taken = state.projects.values().any(|existing| {
            existing.author() == project.author() && existing.name() == project.name()
        });
        if name_taken {
            return Err(ProjectRepositoryError::DuplicateName {
                author: project.author(),
                name: project.name().clone(),
            });
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut state = self.write()?;
        let slot = state
            .projects
            .get_mut(&project.id())
            .ok_or(ProjectRepositoryError::NotFound(project.id()))?;
        *slot = project.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    async fn find_by_author_and_slug(
        &self,
        author: UserId,
        slug: &ProjectSlug,
    ) -> ProjectRepositoryResult<Option<Project>> {
        let state = self.read()?;
        Ok(state
            .projects
            .values()
            .find(|project| project.author() == author && project.slug() == slug)
            .cloned())
    }

    async fn list_tree(&self, root: ProjectId) -> ProjectRepositoryResult<Vec<Project>> {
        let state = self.read()?;
        let mut tree: Vec<Project> = state
            .projects
            .values()
            .filter(|project| project.root() == root)
            .cloned()
            .collect();
        tree.sort_by_key(Project::created_at);
        Ok(tree)
    }

    async fn list_latest_public(&self, limit: usize) -> ProjectRepositoryResult<Vec<Project>> {
        let state = self.read()?;
        let mut public: Vec<Project> = state
            .projects
            .values()
            .filter(|project| project.is_public())
            .cloned()
            .collect();
        public.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        public.truncate(limit);
        Ok(public)
    }

    async fn add_membership(&self, membership: &Membership) -> ProjectRepositoryResult<bool> {
        let mut state = self.write()?;
        let exists = state.memberships.iter().any(|existing| {
            existing.project_id == membership.project_id && existing.user_id == membership.user_id
        });
        if exists {
            return Ok(false);
        }
        state.memberships.push(membership.clone());
        Ok(true)
    }

    async fn remove_membership(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> ProjectRepositoryResult<bool> {
        let mut state = self.write()?;
        let before = state.memberships.len();
        state
            .memberships
            .retain(|existing| !(existing.project_id == project && existing.user_id == user));
        Ok(state.memberships.len() != before)
    }

    async fn list_memberships(
        &self,
        project: ProjectId,
    ) -> ProjectRepositoryResult<Vec<Membership>> {
        let state = self.read()?;
        Ok(state
            .memberships
            .iter()
            .filter(|membership| membership.project_id == project)
            .cloned()
            .collect())
    }

    async fn add_team(&self, team: &Team) -> ProjectRepositoryResult<bool> {
        let mut state = self.write()?;
        let exists = state.teams.iter().any(|existing| {
            existing.project_id == team.project_id && existing.group_id == team.group_id
        });
        if exists {
            return Ok(false);
        }
        state.teams.push(team.clone());
        Ok(true)
    }

    async fn remove_team(
        &self,
        project: ProjectId,
        group: GroupId,
    ) -> ProjectRepositoryResult<bool> {
        let mut state = self.write()?;
        let before = state.teams.len();
        state
            .teams
            .retain(|existing| !(existing.project_id == project && existing.group_id == group));
        Ok(state.teams.len() != before)
    }

    async fn list_teams(&self, project: ProjectId) -> ProjectRepositoryResult<Vec<Team>> {
        let state = self.read()?;
        Ok(state
            .teams
            .iter()
            .filter(|team| team.project_id == project)
            .cloned()
            .collect())
    }

    async fn store_config(&self, config: &ProjectConfig) -> ProjectRepositoryResult<()> {
        let mut state = self.write()?;
        if state.configs.contains_key(&config.project_id) {
            return Err(ProjectRepositoryError::ConfigAlreadyExists(
                config.project_id,
            ));
        }
        state.configs.insert(config.project_id, *config);
        Ok(())
    }

    async fn find_config(
        &self,
        project: ProjectId,
    ) -> ProjectRepositoryResult<Option<ProjectConfig>> {
        Ok(self.read()?.configs.get(&project).copied())
    }
}
