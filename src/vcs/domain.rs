//! Repository backend values.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Supported version-control backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VcsAlias {
    /// Git repositories.
    Git,
    /// Mercurial repositories.
    #[serde(alias = "hg")]
    Mercurial,
}

impl VcsAlias {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Mercurial => "hg",
        }
    }
}

impl fmt::Display for VcsAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing a VCS alias.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported vcs backend: {0}")]
pub struct ParseVcsAliasError(pub String);

impl TryFrom<&str> for VcsAlias {
    type Error = ParseVcsAliasError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "git" => Ok(Self::Git),
            "hg" | "mercurial" => Ok(Self::Mercurial),
            _ => Err(ParseVcsAliasError(value.to_owned())),
        }
    }
}

/// Location of a repository created for a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    alias: VcsAlias,
    location: String,
}

impl RepositoryRef {
    /// Creates a repository reference.
    #[must_use]
    pub fn new(alias: VcsAlias, location: impl Into<String>) -> Self {
        Self {
            alias,
            location: location.into(),
        }
    }

    /// Returns the backend kind.
    #[must_use]
    pub const fn alias(&self) -> VcsAlias {
        self.alias
    }

    /// Returns the backend-specific location (path or URL).
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.alias, self.location)
    }
}

/// Smart-HTTP operation requested against a project repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsOperation {
    /// Clone, fetch or pull.
    Pull,
    /// Push.
    Push,
}
