//! Configuration errors.

use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or merged.
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
    /// A value is outside its allowed range.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted key of the offending value.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}
