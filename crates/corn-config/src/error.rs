//! Error types for configuration loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A key held a value that cannot be used and has no safe fallback.
    #[error("invalid configuration field")]
    InvalidField {
        /// Configuration key that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// The properties file could not be read.
    #[error("failed to read properties file")]
    PropertiesRead {
        /// Path of the properties file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The properties file was not a flat YAML mapping.
    #[error("failed to parse properties file")]
    PropertiesParse {
        /// Path of the properties file.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_messages_stay_constant() {
        let invalid = ConfigError::InvalidField {
            field: "CORN_HTTP_PORT",
            reason: "out_of_range",
            value: Some("0".to_string()),
        };
        assert_eq!(invalid.to_string(), "invalid configuration field");
        assert!(invalid.source().is_none());

        let read = ConfigError::PropertiesRead {
            path: PathBuf::from("corn.yaml"),
            source: io::Error::other("missing"),
        };
        assert_eq!(read.to_string(), "failed to read properties file");
        assert!(read.source().is_some());
    }
}
