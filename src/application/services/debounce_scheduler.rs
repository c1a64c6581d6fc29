use futures::future::BoxFuture;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Callback run when the quiet period elapses
pub type FireCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Whether a countdown is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Armed,
}

/// Single-shot, resettable countdown
///
/// Every `trigger` cancels the pending countdown and starts a new one, so
/// the callback runs once, `interval` after the last trigger of a burst.
/// The callback itself runs detached: a trigger that arrives while it is
/// executing only arms the next countdown. [`settle`](Self::settle) waits
/// for callbacks that are still running.
pub struct DebounceScheduler {
    interval: Duration,
    on_fire: FireCallback,
    pending: Mutex<Option<JoinHandle<()>>>,
    /// Callbacks spawned by elapsed countdowns; locked without awaiting so
    /// an abort can never land between spawning and recording
    running: Arc<SyncMutex<Vec<JoinHandle<()>>>>,
}

impl DebounceScheduler {
    pub fn new(interval: Duration, on_fire: FireCallback) -> Self {
        Self {
            interval,
            on_fire,
            pending: Mutex::new(None),
            running: Arc::new(SyncMutex::new(Vec::new())),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Restart the countdown
    pub async fn trigger(&self) {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let interval = self.interval;
        let on_fire = Arc::clone(&self.on_fire);
        let running = Arc::clone(&self.running);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            trace!(interval_ms = interval.as_millis() as u64, "debounce interval elapsed");
            let mut running = running.lock().unwrap_or_else(PoisonError::into_inner);
            running.retain(|handle| !handle.is_finished());
            running.push(tokio::spawn(on_fire()));
        }));
    }

    /// Drop the pending countdown, if any, without firing
    pub async fn cancel(&self) {
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
    }

    /// Wait until no callback is running
    ///
    /// Callbacks that start while waiting are awaited too. Cancel first if
    /// no new countdown should elapse in the meantime.
    pub async fn settle(&self) {
        loop {
            let running: Vec<_> = std::mem::take(
                &mut *self.running.lock().unwrap_or_else(PoisonError::into_inner),
            );
            if running.is_empty() {
                return;
            }
            for handle in running {
                if let Err(e) = handle.await {
                    debug!(error = %e, "fire callback did not complete");
                }
            }
        }
    }

    /// Whether a fired callback has not finished yet
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|handle| !handle.is_finished())
    }

    pub async fn state(&self) -> DebounceState {
        match self.pending.lock().await.as_ref() {
            Some(handle) if !handle.is_finished() => DebounceState::Armed,
            _ => DebounceState::Idle,
        }
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_scheduler(interval: Duration) -> (DebounceScheduler, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let on_fire: FireCallback = Arc::new(move || {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });
        (DebounceScheduler::new(interval, on_fire), fired)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_interval() {
        let (scheduler, fired) = counting_scheduler(Duration::from_secs(5));
        assert_eq!(scheduler.state().await, DebounceState::Idle);

        scheduler.trigger().await;
        assert_eq!(scheduler.state().await, DebounceState::Armed);

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.state().await, DebounceState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_restarts_countdown() {
        let (scheduler, fired) = counting_scheduler(Duration::from_secs(5));

        scheduler.trigger().await;
        tokio::time::sleep(Duration::from_secs(4)).await;
        scheduler.trigger().await;
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let (scheduler, fired) = counting_scheduler(Duration::from_secs(1));

        scheduler.trigger().await;
        scheduler.cancel().await;
        assert_eq!(scheduler.state().await, DebounceState::Idle);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_pending_countdown() {
        let (scheduler, fired) = counting_scheduler(Duration::from_secs(1));

        scheduler.trigger().await;
        drop(scheduler);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_waits_for_running_callback() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);
        let on_fire: FireCallback = Arc::new(move || {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });
        let scheduler = DebounceScheduler::new(Duration::from_secs(1), on_fire);

        scheduler.trigger().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(scheduler.is_running());
        assert_eq!(finished.load(Ordering::SeqCst), 0);

        scheduler.settle().await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_returns_when_nothing_fired() {
        let (scheduler, fired) = counting_scheduler(Duration::from_secs(1));
        scheduler.settle().await;
        assert!(!scheduler.is_running());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
