pub mod debounce_scheduler;

pub use debounce_scheduler::{DebounceScheduler, DebounceState, FireCallback};
