use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of filesystem change reported by the watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A file appeared
    Add,
    /// An existing file was modified
    Change,
    /// A file disappeared
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Add => write!(f, "add"),
            ChangeKind::Change => write!(f, "change"),
            ChangeKind::Delete => write!(f, "delete"),
        }
    }
}

/// A single change notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// What happened to the file
    pub kind: ChangeKind,

    /// Path relative to the repository root, `/`-separated
    pub path: String,
}

impl ChangeEvent {
    /// Create a new change event
    pub fn new(kind: ChangeKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Pending change identifiers accumulated between publish cycles
///
/// Paths are deduplicated and kept sorted so commit messages built from a
/// snapshot are stable. The collector does no locking of its own; the watch
/// session shares it behind an async mutex.
#[derive(Debug, Clone, Default)]
pub struct ChangeCollector {
    pending: BTreeSet<String>,
}

impl ChangeCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a changed path. Returns `true` if it was not already pending.
    pub fn record(&mut self, change_id: impl Into<String>) -> bool {
        self.pending.insert(change_id.into())
    }

    /// Current pending set, without clearing it
    pub fn snapshot(&self) -> Vec<String> {
        self.pending.iter().cloned().collect()
    }

    /// Drop every pending identifier
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove the identifiers of a previous snapshot
    ///
    /// Anything recorded after the snapshot was taken stays pending.
    pub fn retire(&mut self, snapshot: &[String]) {
        for change_id in snapshot {
            self.pending.remove(change_id);
        }
    }

    /// Number of pending identifiers
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
