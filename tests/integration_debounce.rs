//! Timing tests for the watch session, on tokio's paused clock

mod common;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use autover::application::use_cases::publish_version::{PublishOutcome, SkipReason};
use autover::application::use_cases::watch_changes::WatchSession;
use autover::domain::entities::{ChangeEvent, ChangeKind, WatchConfig};
use autover::infrastructure::scm::GitCommands;
use common::mock_services::ScriptedCommandRunner;

fn session(runner: &ScriptedCommandRunner) -> (WatchSession, UnboundedReceiver<PublishOutcome>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let config = WatchConfig::default().with_debounce(Duration::from_secs(5));
    let session = WatchSession::new(
        config,
        Arc::new(runner.clone()),
        Arc::new(GitCommands::new()),
        Some(tx),
    );
    (session, rx)
}

fn change(path: &str) -> ChangeEvent {
    ChangeEvent::new(ChangeKind::Change, path)
}

async fn next_published(rx: &mut UnboundedReceiver<PublishOutcome>) -> Vec<String> {
    loop {
        match rx.recv().await {
            Some(PublishOutcome::Published { changes, .. }) => return changes,
            Some(PublishOutcome::Skipped(_)) => continue,
            other => panic!("Expected Published, got {:?}", other),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_is_published_once() {
    let runner = ScriptedCommandRunner::new();
    let (session, mut rx) = session(&runner);

    session.on_change(change("a.txt")).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    session.on_change(change("b.txt")).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    session.on_change(change("a.txt")).await;

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert_eq!(runner.calls().len(), 0);

    assert_eq!(next_published(&mut rx).await, vec!["a.txt".to_string(), "b.txt".to_string()]);
    assert_eq!(runner.count("commit"), 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(runner.count("commit"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_separate_bursts_are_published_separately() {
    let runner = ScriptedCommandRunner::new();
    let (session, mut rx) = session(&runner);

    session.on_change(change("a.txt")).await;
    assert_eq!(next_published(&mut rx).await, vec!["a.txt".to_string()]);

    tokio::time::sleep(Duration::from_secs(10)).await;
    session.on_change(change("b.txt")).await;
    assert_eq!(next_published(&mut rx).await, vec!["b.txt".to_string()]);

    assert_eq!(runner.count("commit"), 2);
    assert!(session.pending().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_changes_during_slow_cycle_publish_afterwards() {
    // eight commands at two seconds each outlast the five second interval
    let runner = ScriptedCommandRunner::new().with_delay(Duration::from_secs(2));
    let (session, mut rx) = session(&runner);

    session.on_change(change("a.txt")).await;
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(session.publisher().is_processing());

    session.on_change(change("c.txt")).await;

    let mut outcomes = Vec::new();
    let mut published = Vec::new();
    while published.len() < 2 {
        let outcome = rx.recv().await.expect("session dropped the outcome channel");
        if let PublishOutcome::Published { changes, .. } = &outcome {
            published.push(changes.clone());
        }
        outcomes.push(outcome);
    }

    assert_eq!(published, vec![vec!["a.txt".to_string()], vec!["c.txt".to_string()]]);
    assert!(outcomes
        .iter()
        .any(|outcome| matches!(outcome, PublishOutcome::Skipped(SkipReason::AlreadyProcessing))));
    assert!(session.pending().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drops_pending_changes() {
    let runner = ScriptedCommandRunner::new();
    let (session, _rx) = session(&runner);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    events_tx.send(Ok(change("a.txt"))).unwrap();

    let shutdown = tokio::time::sleep(Duration::from_secs(1));
    session.run(events_rx, shutdown).await.unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(runner.calls().is_empty());
    assert!(session.pending().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_running_cycle() {
    let runner = ScriptedCommandRunner::new().with_delay(Duration::from_secs(2));
    let (session, mut rx) = session(&runner);

    session.on_change(change("a.txt")).await;
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(session.publisher().is_processing());

    let (_events_tx, events_rx) = mpsc::unbounded_channel();
    session.run(events_rx, async {}).await.unwrap();

    assert!(!session.publisher().is_processing());
    assert_eq!(runner.call_args().last().map(String::as_str), Some("checkout main"));
    assert_eq!(next_published(&mut rx).await, vec!["a.txt".to_string()]);
}
