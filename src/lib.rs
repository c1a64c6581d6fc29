//! # autover - automatic version snapshots for a working tree
//!
//! `autover` watches a project directory. After a quiet period without edits
//! it commits everything that changed to a fresh branch named after the
//! current time, tags it, pushes both, and switches back to the branch that
//! was checked out before.
//!
//! ## Quick Start
//!
//! 1. Optionally write a settings file (`.autover.yml`):
//!
//! ```bash
//! autover init
//! ```
//!
//! 2. Start watching:
//!
//! ```bash
//! autover watch --interval-ms 5000 --remote origin
//! ```
//!
//! ## Architecture
//!
//! The crate is organized using clean architecture principles:
//!
//! - [`domain`]: pending changes, settings and naming rules
//! - [`application`]: the publish cycle, the debounce timer and the watch loop
//! - [`infrastructure`]: filesystem notifications, process execution and git command lines
//! - [`presentation`]: CLI interface and console output
//! - [`common`]: shared error handling
//!
//! ## Publish cycle
//!
//! [`application::use_cases::publish_version::VersionPublisher`] runs these
//! steps in order and stops at the first failure:
//!
//! 1. record the current branch (or commit, when HEAD is detached)
//! 2. create and switch to `<prefix>/<timestamp>`
//! 3. stage everything
//! 4. commit, listing the changed files
//! 5. push the branch
//! 6. create an annotated tag with the same name
//! 7. push tags
//! 8. switch back
//!
//! ## Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use autover::application::use_cases::watch_changes::WatchSession;
//! use autover::infrastructure::filesystem::ConfigStore;
//! use autover::infrastructure::process::{ExecutionConfig, ProcessCommandRunner};
//! use autover::infrastructure::scm::GitCommands;
//! use autover::infrastructure::watch::FsWatcher;
//!
//! # async fn example() -> autover::Result<()> {
//! let root = std::env::current_dir()?;
//! let config = ConfigStore::new().load(&root)?;
//! let runner = ProcessCommandRunner::new(ExecutionConfig::new().with_timeout(config.command_timeout_secs));
//! let (_watcher, events) = FsWatcher::start(&root, config.ignore_policy()?)?;
//!
//! let session = WatchSession::new(config, Arc::new(runner), Arc::new(GitCommands::new()), None);
//! session.run(events, async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::AutoverError;
pub use crate::common::result::AutoverResult as Result;
