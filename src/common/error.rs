use std::path::PathBuf;
use thiserror::Error;

use crate::infrastructure::filesystem::config_store::ConfigStoreError;
use crate::infrastructure::process::CommandRunnerError;
use crate::infrastructure::watch::WatcherError;

/// Crate-level error type
///
/// Layer-specific errors convert into this type at the session and CLI
/// boundaries.
#[derive(Error, Debug)]
pub enum AutoverError {
    #[error("Watch error: {message}")]
    WatchError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<WatcherError>,
    },

    #[error("Command execution failed: {message}")]
    CommandError {
        message: String,
        command: String,
        exit_code: Option<i32>,
        #[source]
        source: Option<CommandRunnerError>,
    },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<ConfigStoreError>,
    },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Validation error: {field} - {message}")]
    ValidationError {
        field: String,
        message: String,
        value: Option<String>,
    },

    #[error("Operation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl AutoverError {
    pub fn watch_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: WatcherError,
    ) -> Self {
        Self::WatchError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn config_error_with_source(message: impl Into<String>, source: ConfigStoreError) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn filesystem_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn validation_error(
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
            value,
        }
    }

    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }
}

impl From<CommandRunnerError> for AutoverError {
    fn from(error: CommandRunnerError) -> Self {
        match error {
            CommandRunnerError::Timeout {
                timeout_seconds, ..
            } => Self::timeout(timeout_seconds),
            other => Self::CommandError {
                message: other.to_string(),
                command: other.command().to_string(),
                exit_code: other.exit_code(),
                source: Some(other),
            },
        }
    }
}

impl From<WatcherError> for AutoverError {
    fn from(error: WatcherError) -> Self {
        let path = error.path().map(PathBuf::from);
        Self::watch_error_with_source("File watcher failed", path, error)
    }
}

impl From<ConfigStoreError> for AutoverError {
    fn from(error: ConfigStoreError) -> Self {
        Self::config_error_with_source("Failed to load configuration", error)
    }
}

impl From<std::io::Error> for AutoverError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<regex::Error> for AutoverError {
    fn from(error: regex::Error) -> Self {
        Self::validation_error("ignore_patterns", error.to_string(), None)
    }
}
