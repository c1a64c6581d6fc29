use colored::{Color, Colorize};
use console::Term;

use crate::application::use_cases::publish_version::{PublishOutcome, SkipReason};
use crate::domain::entities::{ChangeEvent, ChangeKind, WatchConfig};

/// Status indicator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Success,
    Error,
    Warning,
    Info,
    Working,
}

/// Display utilities for the CLI interface
#[derive(Debug, Clone)]
pub struct DisplayHelper {
    pub use_color: bool,
}

impl DisplayHelper {
    /// Create a new DisplayHelper
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Colour unless disabled or stdout is not a colour terminal
    pub fn detect(no_color: bool) -> Self {
        Self::new(!no_color && Term::stdout().features().colors_supported())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.print_status(StatusType::Success, message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "✗".red().bold(), message);
        } else {
            eprintln!("[ERROR] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        self.print_status(StatusType::Warning, message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        self.print_status(StatusType::Info, message);
    }

    /// Print a section header
    pub fn section_header(&self, title: &str) {
        if self.use_color {
            println!("\n{}", title.bold().underline());
        } else {
            println!("\n=== {} ===", title);
        }
    }

    /// Format a file path with appropriate styling
    pub fn format_path(&self, path: &str) -> String {
        if self.use_color {
            path.cyan().to_string()
        } else {
            format!("'{}'", path)
        }
    }

    /// Format a branch name with appropriate styling
    pub fn format_branch(&self, branch: &str) -> String {
        if self.use_color {
            branch.green().to_string()
        } else {
            format!("'{}'", branch)
        }
    }

    /// Print a status indicator
    pub fn print_status(&self, status: StatusType, message: &str) {
        let (icon, color) = match status {
            StatusType::Success => ("✓", Color::Green),
            StatusType::Error => ("✗", Color::Red),
            StatusType::Warning => ("⚠", Color::Yellow),
            StatusType::Info => ("::", Color::Blue),
            StatusType::Working => ("→", Color::Cyan),
        };

        if self.use_color {
            println!("{} {}", icon.color(color).bold(), message);
        } else {
            println!("{} {}", status_label(status), message);
        }
    }

    /// Print aligned `key: value` rows
    pub fn print_settings(&self, rows: &[(&str, String)]) {
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in rows {
            let key = format!("{:<width$}", key, width = width);
            if self.use_color {
                println!("  {}  {}", key.bold(), value);
            } else {
                println!("  {}  {}", key, value);
            }
        }
    }

    /// Print the effective settings of a watch session
    pub fn print_watch_settings(&self, config: &WatchConfig) {
        self.section_header("Watching for changes");
        let timeout = config
            .command_timeout_secs
            .map(|secs| format!("{}s", secs))
            .unwrap_or_else(|| "none".to_string());

        self.print_settings(&[
            ("directory", self.format_path(&config.root.display().to_string())),
            ("interval", format!("{}ms", config.debounce_ms)),
            ("remote", config.remote.clone()),
            ("branch prefix", self.format_branch(&config.branch_prefix)),
            ("command timeout", timeout),
            ("restore on failure", config.restore_on_failure.to_string()),
            ("ignore", config.ignore_patterns.join("  ")),
        ]);
        println!();
    }

    /// One line per detected change
    pub fn change_detected(&self, event: &ChangeEvent) {
        let kind = event.kind.to_string();
        let kind = if self.use_color {
            match event.kind {
                ChangeKind::Add => kind.green().to_string(),
                ChangeKind::Change => kind.yellow().to_string(),
                ChangeKind::Delete => kind.red().to_string(),
            }
        } else {
            kind
        };
        self.print_status(
            StatusType::Working,
            &format!("change detected: {} {}", kind, self.format_path(&event.path)),
        );
    }

    /// Report how a publish cycle ended
    pub fn publish_outcome(&self, outcome: &PublishOutcome) {
        match outcome {
            PublishOutcome::Published { branch, changes } => self.success(&format!(
                "created version {} ({} changed {})",
                self.format_branch(branch),
                changes.len(),
                if changes.len() == 1 { "file" } else { "files" }
            )),
            PublishOutcome::NothingToCommit { branch } => self.info(&format!(
                "nothing to commit, discarded {}",
                self.format_branch(branch)
            )),
            PublishOutcome::Failed {
                branch,
                failure,
                restored,
            } => {
                self.error(&format!("failed to publish {}: {}", self.format_branch(branch), failure));
                if *restored {
                    self.info("switched back to the original branch");
                }
            }
            PublishOutcome::Skipped(SkipReason::AlreadyProcessing) => {
                self.info("a publish cycle is already running; changes stay pending")
            }
            PublishOutcome::Skipped(SkipReason::NoPendingChanges) => {}
        }
    }
}

fn status_label(status: StatusType) -> &'static str {
    match status {
        StatusType::Success => "[OK]",
        StatusType::Error => "[ERROR]",
        StatusType::Warning => "[WARN]",
        StatusType::Info => "[INFO]",
        StatusType::Working => "[WORK]",
    }
}
