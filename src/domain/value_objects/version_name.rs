use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default prefix for generated version branches and tags
pub const DEFAULT_BRANCH_PREFIX: &str = "auto-version";

/// Errors for version names and their prefix
#[derive(Debug, Error, PartialEq)]
pub enum VersionNameError {
    #[error("Branch prefix cannot be empty")]
    Empty,

    #[error("Branch prefix too long: {0} characters (max: 200)")]
    TooLong(usize),

    #[error("Invalid character in branch prefix: {0:?}")]
    InvalidCharacter(char),

    #[error("Branch prefix cannot start with '-' or '/': {0}")]
    InvalidStart(String),

    #[error("Branch prefix cannot end with '/', '.' or '.lock': {0}")]
    InvalidEnd(String),

    #[error("Branch prefix contains consecutive dots or slashes: {0}")]
    ConsecutiveSeparators(String),
}

/// Name of the branch and tag created by one publish cycle
///
/// `<prefix>/<timestamp>`, where the timestamp is the cycle start time in
/// UTC as an ISO-8601 string with `:` and `.` replaced by `-`, e.g.
/// `auto-version/2024-05-01T09-30-12-345Z`. Names sort chronologically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionName {
    prefix: String,
    timestamp: String,
}

impl VersionName {
    /// Build a version name for `time`
    pub fn from_timestamp(prefix: &str, time: DateTime<Utc>) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            timestamp: time.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string(),
        }
    }

    /// Build a version name for the current time
    pub fn now(prefix: &str) -> Self {
        Self::from_timestamp(prefix, Utc::now())
    }

    /// The ref-safe timestamp part
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The full branch name
    pub fn branch(&self) -> String {
        format!("{}/{}", self.prefix, self.timestamp)
    }

    /// The tag name, identical to the branch name
    pub fn tag(&self) -> String {
        self.branch()
    }

    /// Commit message listing the changed paths of a snapshot
    pub fn commit_message(&self, changes: &[String]) -> String {
        format!(
            "Auto version: {} - changed files: {}",
            self.timestamp,
            changes.join(", ")
        )
    }

    /// Annotation for the version tag
    pub fn tag_message(&self) -> String {
        format!("Auto version tag {}", self.timestamp)
    }

    /// Check that `prefix` can lead a git ref name
    pub fn validate_prefix(prefix: &str) -> Result<(), VersionNameError> {
        if prefix.is_empty() {
            return Err(VersionNameError::Empty);
        }

        if prefix.len() > 200 {
            return Err(VersionNameError::TooLong(prefix.len()));
        }

        if prefix.starts_with('-') || prefix.starts_with('/') {
            return Err(VersionNameError::InvalidStart(prefix.to_string()));
        }

        if prefix.ends_with('/') || prefix.ends_with('.') || prefix.ends_with(".lock") {
            return Err(VersionNameError::InvalidEnd(prefix.to_string()));
        }

        // ASCII control characters, space, ~, ^, :, ?, *, [, \ and DEL
        if let Some(ch) = prefix.chars().find(|ch| {
            ch.is_ascii_control() || matches!(ch, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\')
        }) {
            return Err(VersionNameError::InvalidCharacter(ch));
        }

        if prefix.contains("..") || prefix.contains("//") || prefix.contains("@{") {
            return Err(VersionNameError::ConsecutiveSeparators(prefix.to_string()));
        }

        Ok(())
    }
}

impl fmt::Display for VersionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix, self.timestamp)
    }
}
