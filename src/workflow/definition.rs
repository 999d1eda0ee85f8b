//! Static workflow definition values.

use super::WorkflowError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifier under which a workflow definition is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(String);

impl WorkflowId {
    /// Identifier of the built-in workflow.
    pub const DEFAULT: &'static str = "default";

    /// Creates a normalized (trimmed, lowercase) workflow identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::EmptyWorkflowId`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkflowError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(WorkflowError::EmptyWorkflowId);
        }
        Ok(Self(normalized))
    }

    /// Returns the identifier of the built-in workflow.
    #[must_use]
    pub fn default_workflow() -> Self {
        Self(Self::DEFAULT.to_owned())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named entry with an explicit ordering position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedName {
    /// Display name, unique within its dimension.
    pub name: String,
    /// Ordering position (ascending).
    pub order: i32,
}

impl RankedName {
    /// Creates a ranked entry.
    #[must_use]
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            order,
        }
    }
}

/// Status entry of a workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSpec {
    /// Status name, unique within the workflow.
    pub name: String,
    /// Ordering position (ascending).
    pub order: i32,
    /// Whether tasks in this status count as resolved.
    pub is_resolved: bool,
    /// Whether new tasks may start in this status.
    pub is_initial: bool,
}

impl StatusSpec {
    /// Creates an unresolved, non-initial status entry.
    #[must_use]
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            order,
            is_resolved: false,
            is_initial: false,
        }
    }

    /// Flags the status as resolved.
    #[must_use]
    pub const fn resolved(mut self) -> Self {
        self.is_resolved = true;
        self
    }

    /// Flags the status as initial.
    #[must_use]
    pub const fn initial(mut self) -> Self {
        self.is_initial = true;
        self
    }
}

/// Taxonomy seeded into a project during setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    id: WorkflowId,
    components: Vec<String>,
    task_types: Vec<RankedName>,
    priorities: Vec<RankedName>,
    statuses: Vec<StatusSpec>,
}

impl WorkflowDefinition {
    /// Creates a validated workflow definition.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::MissingInitialStatus`] when no status is
    /// initial and [`WorkflowError::DuplicateEntry`] when a dimension repeats
    /// a name.
    pub fn new(
        id: WorkflowId,
        components: Vec<String>,
        task_types: Vec<RankedName>,
        priorities: Vec<RankedName>,
        statuses: Vec<StatusSpec>,
    ) -> Result<Self, WorkflowError> {
        ensure_unique(&id, "component", components.iter().map(String::as_str))?;
        ensure_unique(&id, "task type", task_types.iter().map(|t| t.name.as_str()))?;
        ensure_unique(&id, "priority", priorities.iter().map(|p| p.name.as_str()))?;
        ensure_unique(&id, "status", statuses.iter().map(|s| s.name.as_str()))?;
        if !statuses.iter().any(|status| status.is_initial) {
            return Err(WorkflowError::MissingInitialStatus(id.to_string()));
        }
        Ok(Self {
            id,
            components,
            task_types,
            priorities,
            statuses,
        })
    }

    /// Returns the built-in workflow.
    #[must_use]
    pub fn default_workflow() -> Self {
        Self {
            id: WorkflowId::default_workflow(),
            components: vec!["Codebase".to_owned(), "Documentation".to_owned()],
            task_types: vec![
                RankedName::new("Bug", 1),
                RankedName::new("Feature", 2),
                RankedName::new("Improvement", 3),
                RankedName::new("Task", 4),
            ],
            priorities: vec![
                RankedName::new("Blocker", 1),
                RankedName::new("Critical", 2),
                RankedName::new("Major", 3),
                RankedName::new("Minor", 4),
                RankedName::new("Trivial", 5),
            ],
            statuses: vec![
                StatusSpec::new("New", 1).initial(),
                StatusSpec::new("Assigned", 2),
                StatusSpec::new("In progress", 3),
                StatusSpec::new("Reopened", 4),
                StatusSpec::new("Fixed", 5).resolved(),
                StatusSpec::new("Duplicate", 6).resolved(),
                StatusSpec::new("Invalid", 7).resolved(),
                StatusSpec::new("Won't fix", 8).resolved(),
            ],
        }
    }

    /// Returns the workflow identifier.
    #[must_use]
    pub const fn id(&self) -> &WorkflowId {
        &self.id
    }

    /// Returns component names.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Returns task type entries.
    #[must_use]
    pub fn task_types(&self) -> &[RankedName] {
        &self.task_types
    }

    /// Returns priority entries.
    #[must_use]
    pub fn priorities(&self) -> &[RankedName] {
        &self.priorities
    }

    /// Returns status entries.
    #[must_use]
    pub fn statuses(&self) -> &[StatusSpec] {
        &self.statuses
    }
}

fn ensure_unique<'a>(
    id: &WorkflowId,
    dimension: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), WorkflowError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.trim().to_lowercase()) {
            return Err(WorkflowError::DuplicateEntry {
                workflow: id.to_string(),
                dimension,
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}
