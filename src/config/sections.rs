//! Configuration sections.

use crate::vcs::VcsAlias;
use crate::workflow::WorkflowId;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How projects are set up after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupSettings {
    /// Run setup on a spawned task instead of inline.
    pub asynchronous: bool,
    /// How many times the spawned task looks for the project row.
    pub visibility_attempts: u32,
    /// Pause between visibility checks, in milliseconds.
    pub visibility_interval_ms: u64,
    /// Create a repository during setup.
    pub create_repositories: bool,
    /// Backend used when the caller does not pick one.
    pub default_vcs: VcsAlias,
    /// Workflow materialized when the caller does not pick one.
    pub default_workflow: String,
}

impl SetupSettings {
    /// Returns the pause between visibility checks.
    #[must_use]
    pub const fn visibility_interval(&self) -> Duration {
        Duration::from_millis(self.visibility_interval_ms)
    }

    /// Returns the default workflow identifier, falling back to `default`
    /// when the configured value is blank.
    #[must_use]
    pub fn default_workflow_id(&self) -> WorkflowId {
        WorkflowId::new(self.default_workflow.as_str())
            .unwrap_or_else(|_| WorkflowId::default_workflow())
    }
}

impl Default for SetupSettings {
    fn default() -> Self {
        Self {
            asynchronous: false,
            visibility_attempts: 5,
            visibility_interval_ms: 200,
            create_repositories: true,
            default_vcs: VcsAlias::Mercurial,
            default_workflow: WorkflowId::DEFAULT.to_owned(),
        }
    }
}

/// Project naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Names (compared by slug) that may not be used for projects.
    pub banned_names: Vec<String>,
    /// How many projects the public feed lists.
    pub feed_limit: usize,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            banned_names: ["admin", "new", "projects", "users", "teams", "feeds"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            feed_limit: 10,
        }
    }
}

/// Repository storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcsSettings {
    /// Directory holding one sub-directory per backend.
    pub root: Utf8PathBuf,
    /// `git` executable.
    pub git_program: String,
    /// `hg` executable.
    pub hg_program: String,
}

impl Default for VcsSettings {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("repositories"),
            git_program: "git".to_owned(),
            hg_program: "hg".to_owned(),
        }
    }
}

/// Defaults written into each project's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Days added to today for a new milestone's default deadline.
    pub milestone_deadline_delta_days: u32,
    /// Revisions per history page.
    pub changesets_paginate_by: u32,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            milestone_deadline_delta_days: 60,
            changesets_paginate_by: 20,
        }
    }
}

/// Outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Sender address.
    pub from_address: String,
    /// Administrator addresses alerted when setup fails.
    pub admin_emails: Vec<String>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            from_address: "projector@localhost".to_owned(),
            admin_emails: Vec::new(),
        }
    }
}

/// Database connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/projector".to_owned(),
            max_connections: 8,
        }
    }
}
