//! Mock services for testing
//!
//! `ScriptedCommandRunner` stands in for real processes. Every command is
//! recorded; responses are chosen by matching the leading arguments.

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use autover::infrastructure::process::{CommandLine, CommandRunner, CommandRunnerError};

#[derive(Debug, Clone)]
enum Response {
    Output(String),
    Failure {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
}

#[derive(Debug, Clone)]
struct Rule {
    prefix: Vec<String>,
    response: Response,
}

/// Command runner that answers from a script
#[derive(Clone)]
pub struct ScriptedCommandRunner {
    rules: Arc<Mutex<Vec<Rule>>>,
    /// Call history for verification
    calls: Arc<Mutex<Vec<CommandLine>>>,
    delay: Option<Duration>,
}

impl ScriptedCommandRunner {
    /// Succeeds for everything and reports `main` as the current branch
    pub fn new() -> Self {
        let runner = Self {
            rules: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        };
        runner.respond(&["rev-parse", "--abbrev-ref", "HEAD"], "main\n");
        runner
    }

    /// Sleep this long inside every command
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer commands starting with `prefix` with `stdout`
    pub fn respond(&self, prefix: &[&str], stdout: &str) {
        self.push_rule(prefix, Response::Output(stdout.to_string()));
    }

    /// Fail commands starting with `prefix`
    pub fn fail_on(&self, prefix: &[&str], exit_code: i32, stdout: &str, stderr: &str) {
        self.push_rule(
            prefix,
            Response::Failure {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
    }

    fn push_rule(&self, prefix: &[&str], response: Response) {
        // newest rule wins
        self.rules.lock().unwrap().insert(
            0,
            Rule {
                prefix: prefix.iter().map(|s| s.to_string()).collect(),
                response,
            },
        );
    }

    /// Commands run so far
    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments of each call joined with spaces, program omitted
    pub fn call_args(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|command| command.arguments().join(" "))
            .collect()
    }

    /// Number of calls whose first argument is `subcommand`
    pub fn count(&self, subcommand: &str) -> usize {
        self.calls()
            .iter()
            .filter(|command| command.arguments().first().map(String::as_str) == Some(subcommand))
            .count()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for ScriptedCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ScriptedCommandRunner {
    async fn run(&self, command: &CommandLine, _working_dir: &Path) -> Result<String, CommandRunnerError> {
        self.calls.lock().unwrap().push(command.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|rule| command.arguments().starts_with(&rule.prefix))
            .map(|rule| rule.response.clone());

        match response {
            None => Ok(String::new()),
            Some(Response::Output(stdout)) => Ok(stdout),
            Some(Response::Failure {
                exit_code,
                stdout,
                stderr,
            }) => Err(CommandRunnerError::CommandFailed {
                command: command.to_string(),
                exit_code,
                stdout,
                stderr,
            }),
        }
    }
}
