use crate::infrastructure::process::{CommandLine, CommandRunnerError};

/// Command vocabulary the publisher needs from a version-control system
///
/// Implementations only build command lines; running them is the job of a
/// `CommandRunner`.
pub trait VersionControl: Send + Sync {
    /// Print the VCS version; used as an availability check
    fn version(&self) -> CommandLine;

    /// Print the name of the checked-out branch (`HEAD` when detached)
    fn current_branch(&self) -> CommandLine;

    /// Print the id of the checked-out commit
    fn current_revision(&self) -> CommandLine;

    /// Create `name` from the current commit and switch to it
    fn create_and_switch_branch(&self, name: &str) -> CommandLine;

    /// Stage every change in the working tree, deletions included
    fn stage_all(&self) -> CommandLine;

    /// Commit staged changes
    fn commit(&self, message: &str) -> CommandLine;

    /// Push branch `name` to `remote`
    fn push_branch(&self, remote: &str, name: &str) -> CommandLine;

    /// Create an annotated tag on the current commit
    fn create_tag(&self, name: &str, message: &str) -> CommandLine;

    /// Push all tags to `remote`
    fn push_tags(&self, remote: &str) -> CommandLine;

    /// Switch to an existing branch or commit
    fn switch_branch(&self, name: &str) -> CommandLine;

    /// Force-delete a local branch
    fn delete_branch(&self, name: &str) -> CommandLine;

    /// Name reported by `current_branch` for a detached HEAD
    fn detached_head_marker(&self) -> &str;

    /// Succeed and print `true` when run anywhere inside a working tree
    fn work_tree_check(&self) -> CommandLine;

    /// Whether a failed commit only means the index had nothing to record
    fn is_nothing_to_commit(&self, error: &CommandRunnerError) -> bool;
}

/// Git implementation of the version-control vocabulary
#[derive(Debug, Clone)]
pub struct GitCommands {
    git_executable: String,
}

impl Default for GitCommands {
    fn default() -> Self {
        Self {
            git_executable: "git".to_string(),
        }
    }
}

impl GitCommands {
    /// Create a new instance using `git` from `PATH`
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new instance with a custom executable path
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            git_executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.git_executable
    }

    fn git<const N: usize>(&self, args: [&str; N]) -> CommandLine {
        CommandLine::new(&self.git_executable).args(args)
    }
}

impl VersionControl for GitCommands {
    fn version(&self) -> CommandLine {
        self.git(["--version"])
    }

    fn current_branch(&self) -> CommandLine {
        self.git(["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn current_revision(&self) -> CommandLine {
        self.git(["rev-parse", "HEAD"])
    }

    fn create_and_switch_branch(&self, name: &str) -> CommandLine {
        self.git(["checkout", "-b", name])
    }

    fn stage_all(&self) -> CommandLine {
        self.git(["add", "-A"])
    }

    fn commit(&self, message: &str) -> CommandLine {
        self.git(["commit", "-m", message])
    }

    fn push_branch(&self, remote: &str, name: &str) -> CommandLine {
        self.git(["push", remote, name])
    }

    fn create_tag(&self, name: &str, message: &str) -> CommandLine {
        self.git(["tag", "-a", name, "-m", message])
    }

    fn push_tags(&self, remote: &str) -> CommandLine {
        self.git(["push", remote, "--tags"])
    }

    fn switch_branch(&self, name: &str) -> CommandLine {
        self.git(["checkout", name])
    }

    fn delete_branch(&self, name: &str) -> CommandLine {
        self.git(["branch", "-D", name])
    }

    fn detached_head_marker(&self) -> &str {
        "HEAD"
    }

    fn work_tree_check(&self) -> CommandLine {
        self.git(["rev-parse", "--is-inside-work-tree"])
    }

    fn is_nothing_to_commit(&self, error: &CommandRunnerError) -> bool {
        // git prints this on stdout and exits with 1
        match error.output() {
            Some((stdout, stderr)) => {
                error.exit_code() == Some(1)
                    && (stdout.contains("nothing to commit")
                        || stdout.contains("no changes added to commit")
                        || stderr.contains("nothing to commit"))
            }
            None => false,
        }
    }
}
