//! Infrastructure layer modules
//!
//! This layer provides concrete implementations for external system interactions:
//! - Filesystem change notifications
//! - Version-control command lines
//! - Process execution with timeouts
//! - Settings file persistence

pub mod filesystem;
pub mod process;
pub mod scm;
pub mod watch;

// Re-export commonly used types
pub use filesystem::{ConfigStore, ConfigStoreError};
pub use process::{CommandLine, CommandRunner, CommandRunnerError, ProcessCommandRunner};
pub use scm::{GitCommands, VersionControl};
pub use watch::{FsWatcher, WatcherError};
