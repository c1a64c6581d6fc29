use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::use_cases::watch_changes::{StopReason, WatchSession};
use crate::common::error::AutoverError;
use crate::common::result::ResultExt;
use crate::domain::entities::WatchConfig;
use crate::infrastructure::filesystem::ConfigStore;
use crate::infrastructure::process::{CommandRunner, CommandRunnerError, ExecutionConfig, ProcessCommandRunner};
use crate::infrastructure::scm::{GitCommands, VersionControl};
use crate::infrastructure::watch::FsWatcher;
use crate::presentation::ui::display::DisplayHelper;

/// Command-line values that take precedence over `.autover.yml`
#[derive(Debug, Clone, Default)]
pub struct WatchOverrides {
    pub interval_ms: Option<u64>,
    pub remote: Option<String>,
    pub branch_prefix: Option<String>,
    /// `Some(0)` disables the timeout
    pub timeout_secs: Option<u64>,
    pub no_restore: bool,
    pub strict_commit: bool,
}

impl WatchOverrides {
    pub fn apply(self, mut config: WatchConfig) -> WatchConfig {
        if let Some(interval_ms) = self.interval_ms {
            config.debounce_ms = interval_ms;
        }
        if let Some(remote) = self.remote {
            config.remote = remote;
        }
        if let Some(prefix) = self.branch_prefix {
            config.branch_prefix = prefix;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.command_timeout_secs = (timeout_secs > 0).then_some(timeout_secs);
        }
        if self.no_restore {
            config.restore_on_failure = false;
        }
        if self.strict_commit {
            config.tolerate_empty_commit = false;
        }
        config
    }
}

/// Watch the repository until Ctrl-C
pub struct WatchCommand {
    /// Repository root
    pub root: PathBuf,
    pub overrides: WatchOverrides,
}

impl WatchCommand {
    pub fn new(root: PathBuf, overrides: WatchOverrides) -> Self {
        Self { root, overrides }
    }

    /// Execute the watch command
    pub async fn execute(&self, display: &DisplayHelper) -> Result<()> {
        let root = self
            .root
            .canonicalize()
            .with_filesystem_error("cannot resolve directory", Some(self.root.clone()))?;

        let config = ConfigStore::new().load(&root).map_err(AutoverError::from)?;
        let config = self.overrides.clone().apply(config);
        config
            .check()
            .map_autover_err(|message| AutoverError::validation_error("watch", message, None))?;

        let vcs = GitCommands::with_executable(&config.git_executable);
        let runner = ProcessCommandRunner::new(ExecutionConfig::new().with_timeout(config.command_timeout_secs));
        ensure_work_tree(&runner, &vcs, &root).await?;

        let version = runner
            .run(&vcs.version(), &root)
            .await
            .map_err(AutoverError::from)
            .with_context(|| format!("`{}` is not available", vcs.executable()))?;
        tracing::debug!(version = %version.trim(), "found version control");

        let ignore = config.ignore_policy().map_err(AutoverError::from)?;
        display.print_watch_settings(&config);

        let (watcher, mut raw_events) = FsWatcher::start(&root, ignore).map_err(AutoverError::from)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outcomes_tx, mut outcomes_rx) = mpsc::unbounded_channel();

        let session = WatchSession::new(
            config,
            Arc::new(runner),
            Arc::new(vcs),
            Some(outcomes_tx),
        );

        let echo = display.clone();
        let forward = tokio::spawn(async move {
            while let Some(event) = raw_events.recv().await {
                if let Ok(change) = &event {
                    echo.change_detected(change);
                }
                if events_tx.send(event).is_err() {
                    break;
                }
            }
        });

        let report = display.clone();
        let reporter = tokio::spawn(async move {
            while let Some(outcome) = outcomes_rx.recv().await {
                report.publish_outcome(&outcome);
            }
        });

        display.info("watching for changes, press Ctrl-C to stop");
        let shutdown = async {
            // without a signal handler the session runs until the watcher stops
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        let stopped = session.run(events_rx, shutdown).await;

        drop(watcher);
        forward.abort();
        // closes the outcome channel once the last cycle's report is queued
        drop(session);
        if tokio::time::timeout(Duration::from_secs(1), reporter).await.is_err() {
            tracing::debug!("outcome reporter did not finish");
        }

        match stopped.map_err(anyhow::Error::from)? {
            StopReason::Shutdown => display.info("stopped"),
            StopReason::EventsClosed => display.warning("file watcher stopped"),
        }
        Ok(())
    }
}

/// Fail unless `root` lies inside a working tree; subdirectories count
async fn ensure_work_tree(runner: &dyn CommandRunner, vcs: &GitCommands, root: &Path) -> Result<()> {
    match runner.run(&vcs.work_tree_check(), root).await {
        Ok(output) if output.trim() == "true" => Ok(()),
        Err(e @ CommandRunnerError::SpawnFailed { .. }) => {
            Err(AutoverError::from(e)).with_context(|| format!("`{}` is not available", vcs.executable()))
        }
        other => {
            tracing::debug!(result = ?other, "work tree check failed");
            Err(anyhow!("{} is not a git repository", root.display()))
        }
    }
}
