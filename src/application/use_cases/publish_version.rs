use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{ChangeCollector, WatchConfig};
use crate::domain::value_objects::VersionName;
use crate::infrastructure::process::{CommandLine, CommandRunner, CommandRunnerError};
use crate::infrastructure::scm::VersionControl;

/// Steps of a publish cycle, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishStep {
    /// Record the branch to return to
    ResolveCurrentBranch,
    /// Create and switch to the version branch
    CreateBranch,
    /// Stage all working tree changes
    StageChanges,
    /// Commit the staged changes
    Commit,
    /// Push the version branch
    PushBranch,
    /// Tag the version commit
    CreateTag,
    /// Push tags
    PushTags,
    /// Switch back to the original branch
    RestoreBranch,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStep::ResolveCurrentBranch => "get-current-branch",
            PublishStep::CreateBranch => "create-branch",
            PublishStep::StageChanges => "stage-all",
            PublishStep::Commit => "commit",
            PublishStep::PushBranch => "push-branch",
            PublishStep::CreateTag => "create-tag",
            PublishStep::PushTags => "push-tags",
            PublishStep::RestoreBranch => "switch-branch",
        };
        f.write_str(name)
    }
}

/// A pipeline step that failed, with the command error behind it
#[derive(Debug, Error)]
#[error("step {step} failed: {source}")]
pub struct PublishFailure {
    pub step: PublishStep,
    #[source]
    pub source: CommandRunnerError,
}

/// Why a `publish` call did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another cycle holds the processing flag
    AlreadyProcessing,
    /// The pending set was empty
    NoPendingChanges,
}

/// Result of one `publish` call
#[derive(Debug)]
pub enum PublishOutcome {
    /// Every step succeeded
    Published { branch: String, changes: Vec<String> },

    /// The commit had nothing to record; the empty branch was discarded
    NothingToCommit { branch: String },

    /// A step failed and the remaining steps were not run
    Failed {
        branch: String,
        failure: PublishFailure,
        /// Whether the original branch was checked out again afterwards
        restored: bool,
    },

    /// The guard rejected the call before any command ran
    Skipped(SkipReason),
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Version branch of the cycle, if one was started
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Published { branch, .. }
            | Self::NothingToCommit { branch }
            | Self::Failed { branch, .. } => Some(branch),
            Self::Skipped(_) => None,
        }
    }
}

/// Holds the processing flag for the lifetime of a cycle
///
/// Released on drop, so the flag is cleared on every exit path including
/// a panic or a cancelled future.
struct ProcessingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ProcessingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// What a cycle has done so far, for the failure path
#[derive(Debug, Default)]
struct CycleProgress {
    original_branch: Option<String>,
    branch_created: bool,
}

/// Commits, tags and pushes pending changes on a fresh version branch
///
/// `publish` is meant to be called when the debounce timer fires. At most
/// one cycle runs at a time; overlapping calls return
/// `Skipped(AlreadyProcessing)` without running any command.
pub struct VersionPublisher {
    config: Arc<WatchConfig>,
    runner: Arc<dyn CommandRunner>,
    vcs: Arc<dyn VersionControl>,
    changes: Arc<Mutex<ChangeCollector>>,
    processing: AtomicBool,
}

impl VersionPublisher {
    pub fn new(
        config: Arc<WatchConfig>,
        runner: Arc<dyn CommandRunner>,
        vcs: Arc<dyn VersionControl>,
        changes: Arc<Mutex<ChangeCollector>>,
    ) -> Self {
        Self {
            config,
            runner,
            vcs,
            changes,
            processing: AtomicBool::new(false),
        }
    }

    /// Whether a cycle is currently running
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Run one publish cycle over the currently pending changes
    pub async fn publish(&self) -> PublishOutcome {
        let Some(_guard) = ProcessingGuard::acquire(&self.processing) else {
            debug!("publish cycle already running, skipping");
            return PublishOutcome::Skipped(SkipReason::AlreadyProcessing);
        };

        let snapshot = self.changes.lock().await.snapshot();
        if snapshot.is_empty() {
            debug!("no pending changes, skipping publish");
            return PublishOutcome::Skipped(SkipReason::NoPendingChanges);
        }

        let version = VersionName::now(&self.config.branch_prefix);
        let branch = version.branch();
        info!(branch = %branch, changes = snapshot.len(), "starting publish cycle");

        let mut progress = CycleProgress::default();
        let outcome = match self.run_pipeline(&version, &snapshot, &mut progress).await {
            Ok(()) => {
                info!(branch = %branch, "published version");
                PublishOutcome::Published {
                    branch,
                    changes: snapshot.clone(),
                }
            }
            Err(failure)
                if failure.step == PublishStep::Commit
                    && self.config.tolerate_empty_commit
                    && self.vcs.is_nothing_to_commit(&failure.source) =>
            {
                info!(branch = %branch, "nothing to commit, discarding version branch");
                self.discard_empty_branch(&branch, &progress).await;
                PublishOutcome::NothingToCommit { branch }
            }
            Err(failure) => {
                error!(branch = %branch, step = %failure.step, error = %failure.source, "publish cycle failed");
                let restored = self.config.restore_on_failure && self.restore_after_failure(&progress).await;
                PublishOutcome::Failed {
                    branch,
                    failure,
                    restored,
                }
            }
        };

        self.changes.lock().await.retire(&snapshot);
        outcome
    }

    async fn run_pipeline(
        &self,
        version: &VersionName,
        snapshot: &[String],
        progress: &mut CycleProgress,
    ) -> Result<(), PublishFailure> {
        let branch = version.branch();
        let remote = self.config.remote.as_str();

        let original = self.resolve_current_branch().await?;
        progress.original_branch = Some(original.clone());

        self.step(PublishStep::CreateBranch, self.vcs.create_and_switch_branch(&branch))
            .await?;
        progress.branch_created = true;

        self.step(PublishStep::StageChanges, self.vcs.stage_all()).await?;
        self.step(PublishStep::Commit, self.vcs.commit(&version.commit_message(snapshot)))
            .await?;
        self.step(PublishStep::PushBranch, self.vcs.push_branch(remote, &branch))
            .await?;
        self.step(
            PublishStep::CreateTag,
            self.vcs.create_tag(&version.tag(), &version.tag_message()),
        )
        .await?;
        self.step(PublishStep::PushTags, self.vcs.push_tags(remote)).await?;
        self.step(PublishStep::RestoreBranch, self.vcs.switch_branch(&original))
            .await?;

        Ok(())
    }

    /// Branch name, or the commit id when HEAD is detached
    async fn resolve_current_branch(&self) -> Result<String, PublishFailure> {
        let name = self
            .step(PublishStep::ResolveCurrentBranch, self.vcs.current_branch())
            .await?
            .trim()
            .to_string();

        if name != self.vcs.detached_head_marker() {
            return Ok(name);
        }

        let revision = self
            .step(PublishStep::ResolveCurrentBranch, self.vcs.current_revision())
            .await?;
        Ok(revision.trim().to_string())
    }

    async fn step(&self, step: PublishStep, command: CommandLine) -> Result<String, PublishFailure> {
        debug!(step = %step, command = %command, "running publish step");
        self.runner
            .run(&command, &self.config.root)
            .await
            .map_err(|source| PublishFailure { step, source })
    }

    /// Best-effort switch back after a failed step
    async fn restore_after_failure(&self, progress: &CycleProgress) -> bool {
        let (Some(original), true) = (&progress.original_branch, progress.branch_created) else {
            return false;
        };

        match self
            .runner
            .run(&self.vcs.switch_branch(original), &self.config.root)
            .await
        {
            Ok(_) => {
                info!(branch = %original, "restored original branch after failure");
                true
            }
            Err(e) => {
                warn!(branch = %original, error = %e, "failed to restore original branch");
                false
            }
        }
    }

    async fn discard_empty_branch(&self, branch: &str, progress: &CycleProgress) {
        let Some(original) = &progress.original_branch else {
            return;
        };

        let cleanup = [
            self.vcs.switch_branch(original),
            self.vcs.delete_branch(branch),
        ];
        for command in cleanup {
            if let Err(e) = self.runner.run(&command, &self.config.root).await {
                warn!(command = %command, error = %e, "cleanup after empty commit failed");
                return;
            }
        }
    }
}
