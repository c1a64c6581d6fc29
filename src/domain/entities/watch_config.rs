use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

use crate::domain::value_objects::ignore_policy::{IgnorePolicy, DEFAULT_IGNORE_PATTERNS};
use crate::domain::value_objects::version_name::{VersionName, DEFAULT_BRANCH_PREFIX};

/// Default quiet period before a publish cycle fires
pub const DEFAULT_DEBOUNCE_MS: u64 = 5_000;

/// Default per-command timeout
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Default remote that version branches and tags are pushed to
pub const DEFAULT_REMOTE: &str = "origin";

/// Settings for one watched repository
///
/// Deserialized from `.autover.yml`; every field has a default so a partial
/// file is valid. `root` never comes from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WatchConfig {
    /// Repository root that is watched and where commands run
    #[serde(skip)]
    pub root: PathBuf,

    /// Quiet period in milliseconds
    #[validate(range(min = 1))]
    pub debounce_ms: u64,

    /// Remote to push version branches and tags to
    #[validate(length(min = 1))]
    pub remote: String,

    /// Prefix of the generated branch and tag names
    #[validate(length(min = 1))]
    pub branch_prefix: String,

    /// Regular expressions for relative paths the watcher drops
    pub ignore_patterns: Vec<String>,

    /// Timeout for each external command; `None` waits forever
    pub command_timeout_secs: Option<u64>,

    /// Switch back to the original branch when a cycle fails mid-way
    pub restore_on_failure: bool,

    /// Treat "nothing to commit" as a skipped cycle instead of a failure
    pub tolerate_empty_commit: bool,

    /// Version-control executable
    #[validate(length(min = 1))]
    pub git_executable: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            remote: DEFAULT_REMOTE.to_string(),
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            ignore_patterns: DEFAULT_IGNORE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            command_timeout_secs: Some(DEFAULT_COMMAND_TIMEOUT_SECS),
            restore_on_failure: true,
            tolerate_empty_commit: true,
            git_executable: "git".to_string(),
        }
    }
}

impl WatchConfig {
    /// Defaults for the repository at `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = root.as_ref().to_path_buf();
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = debounce.as_millis() as u64;
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_branch_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.branch_prefix = prefix.into();
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_command_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        self.command_timeout_secs = timeout_secs;
        self
    }

    pub fn with_restore_on_failure(mut self, restore: bool) -> Self {
        self.restore_on_failure = restore;
        self
    }

    pub fn with_tolerate_empty_commit(mut self, tolerate: bool) -> Self {
        self.tolerate_empty_commit = tolerate;
        self
    }

    pub fn with_git_executable(mut self, executable: impl Into<String>) -> Self {
        self.git_executable = executable.into();
        self
    }

    /// Quiet period as a `Duration`
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Compile the ignore patterns
    pub fn ignore_policy(&self) -> Result<IgnorePolicy, regex::Error> {
        IgnorePolicy::new(&self.ignore_patterns)
    }

    /// Field-level validation plus the checks derive macros cannot express
    ///
    /// Returns a human-readable description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;

        VersionName::validate_prefix(&self.branch_prefix).map_err(|e| e.to_string())?;

        if self.remote.chars().any(char::is_whitespace) {
            return Err(format!("remote name contains whitespace: {:?}", self.remote));
        }

        if self.command_timeout_secs == Some(0) {
            return Err("command_timeout_secs must be at least 1 (or null)".to_string());
        }

        self.ignore_policy()
            .map_err(|e| format!("invalid ignore pattern: {}", e))?;

        Ok(())
    }
}
