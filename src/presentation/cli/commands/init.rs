use anyhow::Result;
use std::path::PathBuf;

use crate::domain::entities::WatchConfig;
use crate::infrastructure::filesystem::{ConfigStore, ConfigStoreError};
use crate::presentation::ui::display::DisplayHelper;

/// Write a `.autover.yml` with the default settings
pub struct InitCommand {
    /// Repository root
    pub root: PathBuf,
    /// Force overwrite existing file
    pub force: bool,
}

impl InitCommand {
    pub fn new(root: PathBuf, force: bool) -> Self {
        Self { root, force }
    }

    /// Execute the init command
    pub async fn execute(&self, display: &DisplayHelper) -> Result<()> {
        let config = WatchConfig::new(&self.root);

        let path = match ConfigStore::new().save(&self.root, &config, self.force) {
            Ok(path) => path,
            Err(ConfigStoreError::AlreadyExists(path)) => {
                return Err(anyhow::anyhow!(
                    "File {} already exists. Use --force to overwrite.",
                    path
                ));
            }
            Err(e) => return Err(e.into()),
        };

        display.success(&format!("created {}", display.format_path(&path.display().to_string())));
        println!();
        println!("Next steps:");
        println!("   1. Adjust the interval, remote and ignore patterns in the file");
        println!("   2. Run 'autover watch' in the repository");

        Ok(())
    }
}
