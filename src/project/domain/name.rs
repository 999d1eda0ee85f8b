//! Validated project names and derived slugs.

use super::ProjectDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a project name, matching the `VARCHAR(64)` column.
const MAX_NAME_LENGTH: usize = 64;

/// Validated project display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Creates a validated project name.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyProjectName`] for blank input,
    /// [`ProjectDomainError::ProjectNameTooLong`] beyond 64 characters and
    /// [`ProjectDomainError::InvalidProjectName`] when no slug can be
    /// derived.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(ProjectDomainError::EmptyProjectName);
        }
        if normalized.chars().count() > MAX_NAME_LENGTH {
            return Err(ProjectDomainError::ProjectNameTooLong(raw));
        }
        if slugify(normalized).is_empty() {
            return Err(ProjectDomainError::InvalidProjectName(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Rejects names whose slug matches a banned name.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::BannedProjectName`] on a match.
    pub fn ensure_allowed<S: AsRef<str>>(&self, banned: &[S]) -> Result<(), ProjectDomainError> {
        let slug = self.slug();
        let is_banned = banned
            .iter()
            .any(|name| slugify(name.as_ref()) == slug.as_str());
        if is_banned {
            return Err(ProjectDomainError::BannedProjectName(self.0.clone()));
        }
        Ok(())
    }

    /// Derives the URL slug for this name.
    #[must_use]
    pub fn slug(&self) -> ProjectSlug {
        ProjectSlug(slugify(&self.0))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL-safe identifier derived from a project name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectSlug(String);

impl ProjectSlug {
    /// Reconstructs a slug from storage or a URL segment.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self(slugify(value))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases ASCII alphanumerics, maps separators to `-` and drops the rest.
fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' || ch == '.' {
            pending_dash = true;
        }
    }
    slug
}
