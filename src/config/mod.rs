//! Layered configuration.
//!
//! Sources, lowest to highest priority:
//! 1. built-in defaults;
//! 2. `projector.toml` in the working directory (or an explicit path);
//! 3. environment variables prefixed with `PROJECTOR_`, using `__` between
//!    section and key (`PROJECTOR_SETUP__ASYNCHRONOUS=true`).

mod error;
mod sections;

pub use error::ConfigError;
pub use sections::{
    DatabaseSettings, NotificationSettings, ProjectSettings, SetupSettings, TrackerSettings,
    VcsSettings,
};

use camino::Utf8Path;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "projector.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PROJECTOR_";

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectorConfig {
    /// Project setup behaviour.
    #[serde(default)]
    pub setup: SetupSettings,
    /// Project naming rules.
    #[serde(default)]
    pub projects: ProjectSettings,
    /// Repository storage.
    #[serde(default)]
    pub vcs: VcsSettings,
    /// Tracker defaults.
    #[serde(default)]
    pub tracker: TrackerSettings,
    /// Outgoing mail.
    #[serde(default)]
    pub notifications: NotificationSettings,
    /// Database connection.
    #[serde(default)]
    pub database: DatabaseSettings,
}

impl ProjectorConfig {
    /// Loads configuration from `projector.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source cannot be parsed or a value is
    /// out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Utf8Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Loads configuration using `path` as the TOML layer.
    ///
    /// A missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source cannot be parsed or a value is
    /// out of range.
    pub fn load_from(path: &Utf8Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the provider chain without extracting it.
    #[must_use]
    pub fn figment(path: &Utf8Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_std_path()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.setup.visibility_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "setup.visibility_attempts".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.tracker.changesets_paginate_by == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tracker.changesets_paginate_by".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.setup.create_repositories && self.vcs.root.as_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "vcs.root".to_owned(),
                reason: "required when repository creation is enabled".to_owned(),
            });
        }
        Ok(())
    }
}
