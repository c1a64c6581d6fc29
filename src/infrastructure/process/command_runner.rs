use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Command runner errors
#[derive(Debug, Error)]
pub enum CommandRunnerError {
    #[error("`{command}` failed with exit code {exit_code}: {}", summary(.stderr, .stdout))]
    CommandFailed {
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("`{command}` timed out after {timeout_seconds} seconds")]
    Timeout {
        command: String,
        timeout_seconds: u64,
    },

    #[error("Failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl CommandRunnerError {
    /// The rendered command line that failed
    pub fn command(&self) -> &str {
        match self {
            Self::CommandFailed { command, .. }
            | Self::Timeout { command, .. }
            | Self::SpawnFailed { command, .. } => command,
            Self::InvalidCommand(command) => command,
        }
    }

    /// Exit code, when the process ran to completion
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Captured output of a failed command, stdout first
    pub fn output(&self) -> Option<(&str, &str)> {
        match self {
            Self::CommandFailed { stdout, stderr, .. } => Some((stdout, stderr)),
            _ => None,
        }
    }
}

fn summary<'a>(stderr: &'a str, stdout: &'a str) -> &'a str {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        stdout.trim()
    } else {
        stderr
    }
}

/// A program and its arguments
///
/// Arguments are passed to the process as-is, never through a shell, so
/// values such as commit messages need no quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs external commands on behalf of the publisher
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` in `working_dir` and return its standard output
    ///
    /// A non-zero exit is an error; the caller decides whether it is fatal.
    async fn run(&self, command: &CommandLine, working_dir: &Path) -> Result<String, CommandRunnerError>;
}

/// Configuration for command execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// Environment variables to set for the process
    pub environment_variables: HashMap<String, String>,

    /// Timeout for command execution in seconds
    pub timeout_seconds: Option<u64>,
}

impl ExecutionConfig {
    /// Create a new execution config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add environment variable
    pub fn with_environment_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: Option<u64>) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// `CommandRunner` backed by real child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessCommandRunner {
    config: ExecutionConfig,
}

impl ProcessCommandRunner {
    pub fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    fn build(&self, command: &CommandLine, working_dir: &Path) -> TokioCommand {
        let mut cmd = TokioCommand::new(command.program());
        cmd.args(command.arguments()).current_dir(working_dir);

        for (key, value) in &self.config.environment_variables {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, command: &CommandLine, working_dir: &Path) -> Result<String, CommandRunnerError> {
        if command.program().trim().is_empty() {
            return Err(CommandRunnerError::InvalidCommand("Command is empty".to_string()));
        }

        let rendered = command.to_string();
        let start_time = Instant::now();
        let mut cmd = self.build(command, working_dir);
        let output_future = cmd.output();

        // Dropping the future on timeout kills the child (kill_on_drop)
        let output = match self.config.timeout_seconds {
            Some(timeout_secs) => timeout(Duration::from_secs(timeout_secs), output_future)
                .await
                .map_err(|_| CommandRunnerError::Timeout {
                    command: rendered.clone(),
                    timeout_seconds: timeout_secs,
                })?,
            None => output_future.await,
        }
        .map_err(|source| CommandRunnerError::SpawnFailed {
            command: rendered.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::trace!(
            command = %rendered,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            status = ?output.status.code(),
            "command finished"
        );

        if !output.status.success() {
            return Err(CommandRunnerError::CommandFailed {
                command: rendered,
                exit_code: output.status.code().unwrap_or(-1),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(stdout)
    }
}
