/// Settings file persistence
pub mod config_store;

pub use config_store::{ConfigStore, ConfigStoreError, CONFIG_FILE_NAME};
