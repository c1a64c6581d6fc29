pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::env;
use std::process::exit;
use tracing_subscriber::EnvFilter;

use crate::presentation::cli::commands::{InitCommand, WatchCommand, WatchOverrides};
use crate::presentation::ui::display::DisplayHelper;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    " ",
    env!("BUILD_DATE"),
    ")\ntarget: ",
    env!("BUILD_TARGET"),
);

/// autover - Publish every batch of edits as a versioned git branch and tag
#[derive(Parser, Debug)]
#[command(name = "autover")]
#[command(about = "Watch a directory and publish each batch of changes as a git branch and tag")]
#[command(version, long_version = LONG_VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Working directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<String>,

    /// Settings for the default `watch` command; `watch`'s own flags win
    #[command(flatten)]
    pub watch: WatchArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the directory and publish changes after each quiet period (default)
    Watch(WatchArgs),

    /// Write a .autover.yml with the default settings
    Init {
        /// Force overwrite existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Flags that override `.autover.yml` for one session
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Quiet period in milliseconds before changes are published
    #[arg(long, env = "AUTOVER_INTERVAL_MS")]
    pub interval_ms: Option<u64>,

    /// Remote to push version branches and tags to
    #[arg(long, env = "AUTOVER_REMOTE")]
    pub remote: Option<String>,

    /// Prefix of generated branch and tag names
    #[arg(long, env = "AUTOVER_BRANCH_PREFIX")]
    pub branch_prefix: Option<String>,

    /// Timeout for each git command in seconds (0 disables)
    #[arg(long, env = "AUTOVER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Stay on the version branch when a cycle fails
    #[arg(long)]
    pub no_restore: bool,

    /// Treat "nothing to commit" as a failed cycle
    #[arg(long)]
    pub strict_commit: bool,
}

impl WatchArgs {
    /// Fill flags missing here from `fallback`
    pub fn or(self, fallback: WatchArgs) -> WatchArgs {
        WatchArgs {
            interval_ms: self.interval_ms.or(fallback.interval_ms),
            remote: self.remote.or(fallback.remote),
            branch_prefix: self.branch_prefix.or(fallback.branch_prefix),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
            no_restore: self.no_restore || fallback.no_restore,
            strict_commit: self.strict_commit || fallback.strict_commit,
        }
    }
}

impl From<WatchArgs> for WatchOverrides {
    fn from(args: WatchArgs) -> Self {
        Self {
            interval_ms: args.interval_ms,
            remote: args.remote,
            branch_prefix: args.branch_prefix,
            timeout_secs: args.timeout_secs,
            no_restore: args.no_restore,
            strict_commit: args.strict_commit,
        }
    }
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        init_tracing(self.cli.verbose);

        let display = DisplayHelper::detect(self.cli.no_color);
        colored::control::set_override(display.use_color);

        // Change directory if specified
        if let Some(ref dir) = self.cli.directory {
            if let Err(e) = env::set_current_dir(dir) {
                display.error(&format!("cannot change to directory {}: {}", dir, e));
                exit(1);
            }
        }

        // Handle the command
        match self.handle_command(&display).await {
            Ok(_) => Ok(()),
            Err(e) => {
                display.error(&format!("{:#}", e));
                exit(1);
            }
        }
    }

    async fn handle_command(&self, display: &DisplayHelper) -> anyhow::Result<()> {
        let root = env::current_dir()?;

        match &self.cli.command {
            Some(Commands::Init { force }) => InitCommand::new(root, *force).execute(display).await,
            Some(Commands::Watch(args)) => {
                let args = args.clone().or(self.cli.watch.clone());
                WatchCommand::new(root, args.into()).execute(display).await
            }
            None => {
                WatchCommand::new(root, self.cli.watch.clone().into())
                    .execute(display)
                    .await
            }
        }
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

/// `RUST_LOG` wins; otherwise info, or debug with `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "autover=debug" } else { "autover=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
