//! In-memory repository for workflow entities.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::project::domain::ProjectId;
use crate::tracker::{
    domain::{Component, Label, LabelKind, Milestone, MilestoneId, Status, StatusId, Transition},
    ports::{WorkflowRepository, WorkflowRepositoryError, WorkflowRepositoryResult},
};

/// Thread-safe in-memory workflow repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowRepository {
    state: Arc<RwLock<InMemoryWorkflowState>>,
}

#[derive(Debug, Default)]
struct InMemoryWorkflowState {
    statuses: HashMap<StatusId, Status>,
    transitions: BTreeSet<Transition>,
    components: Vec<Component>,
    labels: Vec<Label>,
    milestones: HashMap<MilestoneId, Milestone>,
}

impl InMemoryWorkflowRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> WorkflowRepositoryResult<RwLockReadGuard<'_, InMemoryWorkflowState>> {
        self.state.read().map_err(|err| {
            WorkflowRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> WorkflowRepositoryResult<RwLockWriteGuard<'_, InMemoryWorkflowState>> {
        self.state.write().map_err(|err| {
            WorkflowRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

fn same_name(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

fn duplicate(entity: &'static str, project: ProjectId, name: &str) -> WorkflowRepositoryError {
    WorkflowRepositoryError::DuplicateName {
        entity,
        project,
        name: name.to_owned(),
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn insert_status(&self, status: &Status) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let clash = state.statuses.values().any(|existing| {
            existing.project_id == status.project_id && same_name(&existing.name, &status.name)
        });
        if clash {
            return Err(duplicate("status", status.project_id, &status.name));
        }
        state.statuses.insert(status.id, status.clone());
        Ok(())
    }

    async fn find_status(&self, id: StatusId) -> WorkflowRepositoryResult<Option<Status>> {
        Ok(self.read()?.statuses.get(&id).cloned())
    }

    async fn find_status_by_name(
        &self,
        project: ProjectId,
        name: &str,
    ) -> WorkflowRepositoryResult<Option<Status>> {
        Ok(self
            .read()?
            .statuses
            .values()
            .find(|status| status.project_id == project && same_name(&status.name, name))
            .cloned())
    }

    async fn list_statuses(&self, project: ProjectId) -> WorkflowRepositoryResult<Vec<Status>> {
        let mut statuses: Vec<Status> = self
            .read()?
            .statuses
            .values()
            .filter(|status| status.project_id == project)
            .cloned()
            .collect();
        statuses.sort_by(|left, right| {
            left.order
                .cmp(&right.order)
                .then_with(|| left.name.cmp(&right.name))
        });
        Ok(statuses)
    }

    async fn delete_status(&self, id: StatusId) -> WorkflowRepositoryResult<bool> {
        let mut state = self.write()?;
        if state.statuses.remove(&id).is_none() {
            return Ok(false);
        }
        state
            .transitions
            .retain(|edge| edge.source != id && edge.destination != id);
        Ok(true)
    }

    async fn insert_transition(&self, transition: Transition) -> WorkflowRepositoryResult<bool> {
        Ok(self.write()?.transitions.insert(transition))
    }

    async fn delete_transition(&self, transition: Transition) -> WorkflowRepositoryResult<bool> {
        Ok(self.write()?.transitions.remove(&transition))
    }

    async fn transition_exists(&self, transition: Transition) -> WorkflowRepositoryResult<bool> {
        Ok(self.read()?.transitions.contains(&transition))
    }

    async fn list_transitions(
        &self,
        project: ProjectId,
    ) -> WorkflowRepositoryResult<Vec<Transition>> {
        let state = self.read()?;
        Ok(state
            .transitions
            .iter()
            .filter(|edge| {
                state
                    .statuses
                    .get(&edge.source)
                    .is_some_and(|status| status.project_id == project)
            })
            .copied()
            .collect())
    }

    async fn insert_component(&self, component: &Component) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let clash = state.components.iter().any(|existing| {
            existing.project_id == component.project_id
                && same_name(&existing.name, &component.name)
        });
        if clash {
            return Err(duplicate("component", component.project_id, &component.name));
        }
        state.components.push(component.clone());
        Ok(())
    }

    async fn find_component_by_name(
        &self,
        project: ProjectId,
        name: &str,
    ) -> WorkflowRepositoryResult<Option<Component>> {
        Ok(self
            .read()?
            .components
            .iter()
            .find(|component| component.project_id == project && same_name(&component.name, name))
            .cloned())
    }

    async fn list_components(
        &self,
        project: ProjectId,
    ) -> WorkflowRepositoryResult<Vec<Component>> {
        let mut components: Vec<Component> = self
            .read()?
            .components
            .iter()
            .filter(|component| component.project_id == project)
            .cloned()
            .collect();
        components.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(components)
    }

    async fn insert_label(&self, label: &Label) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let clash = state.labels.iter().any(|existing| {
            existing.project_id == label.project_id
                && existing.kind == label.kind
                && same_name(&existing.name, &label.name)
        });
        if clash {
            let entity = match label.kind {
                LabelKind::TaskType => "task type",
                LabelKind::Priority => "priority",
            };
            return Err(duplicate(entity, label.project_id, &label.name));
        }
        state.labels.push(label.clone());
        Ok(())
    }

    async fn find_label_by_name(
        &self,
        project: ProjectId,
        kind: LabelKind,
        name: &str,
    ) -> WorkflowRepositoryResult<Option<Label>> {
        Ok(self
            .read()?
            .labels
            .iter()
            .find(|label| {
                label.project_id == project && label.kind == kind && same_name(&label.name, name)
            })
            .cloned())
    }

    async fn list_labels(
        &self,
        project: ProjectId,
        kind: LabelKind,
    ) -> WorkflowRepositoryResult<Vec<Label>> {
        let mut labels: Vec<Label> = self
            .read()?
            .labels
            .iter()
            .filter(|label| label.project_id == project && label.kind == kind)
            .cloned()
            .collect();
        labels.sort_by(|left, right| {
            left.order
                .cmp(&right.order)
                .then_with(|| left.name.cmp(&right.name))
        });
        Ok(labels)
    }

    async fn insert_milestone(&self, milestone: &Milestone) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let clash = state.milestones.values().any(|existing| {
            existing.project_id == milestone.project_id
                && same_name(&existing.name, &milestone.name)
        });
        if clash {
            return Err(duplicate("milestone", milestone.project_id, &milestone.name));
        }
        state.milestones.insert(milestone.id, milestone.clone());
        Ok(())
    }

    async fn update_milestone(&self, milestone: &Milestone) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let slot = state
            .milestones
            .get_mut(&milestone.id)
            .ok_or(WorkflowRepositoryError::MilestoneNotFound(milestone.id))?;
        *slot = milestone.clone();
        Ok(())
    }

    async fn find_milestone(
        &self,
        id: MilestoneId,
    ) -> WorkflowRepositoryResult<Option<Milestone>> {
        Ok(self.read()?.milestones.get(&id).cloned())
    }

    async fn list_milestones(
        &self,
        project: ProjectId,
    ) -> WorkflowRepositoryResult<Vec<Milestone>> {
        let mut milestones: Vec<Milestone> = self
            .read()?
            .milestones
            .values()
            .filter(|milestone| milestone.project_id == project)
            .cloned()
            .collect();
        milestones.sort_by(|left, right| {
            left.deadline
                .cmp(&right.deadline)
                .then_with(|| left.name.cmp(&right.name))
        });
        Ok(milestones)
    }
}
