//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or mutating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Loading/merging the layered configuration failed
    #[error("Configuration error: {0}")]
    Load(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
