pub mod command_runner;

pub use command_runner::{
    CommandLine,
    CommandRunner,
    CommandRunnerError,
    ExecutionConfig,
    ProcessCommandRunner,
};

#[cfg(test)]
pub use command_runner::MockCommandRunner;
