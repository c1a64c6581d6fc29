use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::services::debounce_scheduler::{DebounceScheduler, FireCallback};
use crate::application::use_cases::publish_version::{PublishOutcome, SkipReason, VersionPublisher};
use crate::common::error::AutoverError;
use crate::common::result::AutoverResult;
use crate::domain::entities::{ChangeCollector, ChangeEvent, WatchConfig};
use crate::infrastructure::process::CommandRunner;
use crate::infrastructure::scm::VersionControl;
use crate::infrastructure::watch::WatcherError;

/// Why a watch session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown future completed
    Shutdown,
    /// The event source closed
    EventsClosed,
}

/// Wires change events, the debounce timer and the publisher together
///
/// Each accepted event is recorded in the pending set and restarts the
/// countdown. When the countdown fires the publisher runs over whatever is
/// pending; changes that arrived during the cycle stay pending and arm the
/// next countdown.
pub struct WatchSession {
    config: Arc<WatchConfig>,
    changes: Arc<Mutex<ChangeCollector>>,
    publisher: Arc<VersionPublisher>,
    scheduler: Arc<DebounceScheduler>,
}

impl WatchSession {
    pub fn new(
        config: WatchConfig,
        runner: Arc<dyn CommandRunner>,
        vcs: Arc<dyn VersionControl>,
        outcomes: Option<UnboundedSender<PublishOutcome>>,
    ) -> Self {
        let config = Arc::new(config);
        let changes = Arc::new(Mutex::new(ChangeCollector::new()));
        let publisher = Arc::new(VersionPublisher::new(
            Arc::clone(&config),
            runner,
            vcs,
            Arc::clone(&changes),
        ));

        let scheduler = Arc::new_cyclic(|weak: &Weak<DebounceScheduler>| {
            let on_fire = fire_callback(
                Arc::clone(&publisher),
                Arc::clone(&changes),
                weak.clone(),
                outcomes,
            );
            DebounceScheduler::new(config.debounce(), on_fire)
        });

        Self {
            config,
            changes,
            publisher,
            scheduler,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn publisher(&self) -> &VersionPublisher {
        &self.publisher
    }

    pub fn scheduler(&self) -> &DebounceScheduler {
        &self.scheduler
    }

    /// Changes recorded but not yet published, sorted
    pub async fn pending(&self) -> Vec<String> {
        self.changes.lock().await.snapshot()
    }

    /// Record one change and restart the countdown
    pub async fn on_change(&self, event: ChangeEvent) {
        debug!(kind = %event.kind, path = %event.path, "change detected");
        let added = self.changes.lock().await.record(event.path);
        if !added {
            debug!("path already pending");
        }
        self.scheduler.trigger().await;
    }

    /// Consume events until the source closes, errors or `shutdown` completes
    ///
    /// A watcher error ends the session and is returned. On exit the pending
    /// countdown is cancelled, a publish cycle that is already running is
    /// awaited so it can switch back, and unpublished changes are dropped.
    pub async fn run<F>(
        &self,
        mut events: UnboundedReceiver<Result<ChangeEvent, WatcherError>>,
        shutdown: F,
    ) -> AutoverResult<StopReason>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping watcher");
                    break Ok(StopReason::Shutdown);
                }
                event = events.recv() => match event {
                    Some(Ok(event)) => self.on_change(event).await,
                    Some(Err(e)) => break Err(AutoverError::from(e)),
                    None => {
                        debug!("event source closed");
                        break Ok(StopReason::EventsClosed);
                    }
                },
            }
        };

        self.scheduler.cancel().await;
        if self.scheduler.is_running() {
            info!("waiting for the running publish cycle to finish");
        }
        self.scheduler.settle().await;
        // a finished cycle may have re-armed the countdown
        self.scheduler.cancel().await;

        let mut changes = self.changes.lock().await;
        if !changes.is_empty() {
            warn!(count = changes.len(), "exiting with unpublished changes");
        }
        changes.clear();

        result
    }
}

fn fire_callback(
    publisher: Arc<VersionPublisher>,
    changes: Arc<Mutex<ChangeCollector>>,
    scheduler: Weak<DebounceScheduler>,
    outcomes: Option<UnboundedSender<PublishOutcome>>,
) -> FireCallback {
    Arc::new(move || {
        let publisher = Arc::clone(&publisher);
        let changes = Arc::clone(&changes);
        let scheduler = scheduler.clone();
        let outcomes = outcomes.clone();

        Box::pin(async move {
            let outcome = publisher.publish().await;
            let rearm = !matches!(outcome, PublishOutcome::Skipped(SkipReason::AlreadyProcessing))
                && !changes.lock().await.is_empty();

            if let Some(tx) = outcomes {
                // receiver may be gone during shutdown
                let _ = tx.send(outcome);
            }

            if rearm {
                if let Some(scheduler) = scheduler.upgrade() {
                    debug!("changes arrived during publish, re-arming");
                    scheduler.trigger().await;
                }
            }
        })
    })
}
