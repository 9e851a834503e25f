//! Error types for the server_config crate.

use thiserror::Error;

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be used.
    #[error("Invalid value {value:?} for {var}: expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    pub fn invalid(var: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        Self::Invalid {
            var,
            value: value.into(),
            expected,
        }
    }
}
