pub mod change_set;
pub mod watch_config;

pub use change_set::{ChangeCollector, ChangeEvent, ChangeKind};
pub use watch_config::WatchConfig;
