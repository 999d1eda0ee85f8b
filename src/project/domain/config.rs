//! Per-project configuration record.

use super::ProjectId;
use serde::{Deserialize, Serialize};

/// Tracker settings stored once per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Owning project.
    pub project_id: ProjectId,
    /// Number of revisions shown per history page.
    pub changesets_paginate_by: u32,
    /// Days added to today for a new milestone's default deadline.
    pub milestone_deadline_delta_days: u32,
}

impl ProjectConfig {
    /// Creates a configuration record.
    #[must_use]
    pub const fn new(
        project_id: ProjectId,
        changesets_paginate_by: u32,
        milestone_deadline_delta_days: u32,
    ) -> Self {
        Self {
            project_id,
            changesets_paginate_by,
            milestone_deadline_delta_days,
        }
    }
}
