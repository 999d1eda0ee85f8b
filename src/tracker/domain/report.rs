//! Aggregated task counts behind the project report charts.

use super::{ComponentId, LabelId, Status, StatusId, Task};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task count for one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    /// Status name.
    pub name: String,
    /// Whether the status counts as resolved.
    pub is_resolved: bool,
    /// Number of tasks in the status.
    pub count: usize,
}

/// Task counts grouped by dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Total number of tasks.
    pub total: usize,
    /// Number of tasks in resolved statuses.
    pub resolved: usize,
    /// Counts per status, in status order.
    pub by_status: Vec<StatusCount>,
    /// Counts per priority label.
    pub by_priority: BTreeMap<LabelId, usize>,
    /// Counts per task type label.
    pub by_type: BTreeMap<LabelId, usize>,
    /// Counts per component.
    pub by_component: BTreeMap<ComponentId, usize>,
}

impl TaskReport {
    /// Builds the report for `tasks` using the project's `statuses`.
    #[must_use]
    pub fn build(tasks: &[Task], statuses: &[Status]) -> Self {
        let mut per_status: BTreeMap<StatusId, usize> = BTreeMap::new();
        let mut report = Self {
            total: tasks.len(),
            ..Self::default()
        };
        for task in tasks {
            let fields = task.fields();
            *per_status.entry(fields.status).or_default() += 1;
            *report.by_priority.entry(fields.priority).or_default() += 1;
            *report.by_type.entry(fields.task_type).or_default() += 1;
            *report.by_component.entry(fields.component).or_default() += 1;
        }

        let mut ordered: Vec<&Status> = statuses.iter().collect();
        ordered.sort_by_key(|status| (status.order, status.name.clone()));
        for status in ordered {
            let count = per_status.get(&status.id).copied().unwrap_or_default();
            if status.is_resolved {
                report.resolved += count;
            }
            report.by_status.push(StatusCount {
                name: status.name.clone(),
                is_resolved: status.is_resolved,
                count,
            });
        }
        report
    }

    /// Returns the number of unresolved tasks.
    #[must_use]
    pub const fn open(&self) -> usize {
        self.total.saturating_sub(self.resolved)
    }
}
