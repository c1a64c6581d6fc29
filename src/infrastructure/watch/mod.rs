//! Filesystem change source
//!
//! Translates native notifications into `ChangeEvent`s relative to the
//! watched root, after applying the ignore policy.

pub mod fs_watcher;

pub use fs_watcher::{FsWatcher, WatcherError};
