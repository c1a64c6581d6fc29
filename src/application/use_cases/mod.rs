pub mod publish_version;
pub mod watch_changes;

pub use publish_version::{PublishFailure, PublishOutcome, PublishStep, SkipReason, VersionPublisher};
pub use watch_changes::{StopReason, WatchSession};
