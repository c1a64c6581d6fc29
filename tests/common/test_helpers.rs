//! Test helper functions and utilities
//!
//! Scratch git repositories with a bare remote, driven through the real
//! `git` binary.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use autover::infrastructure::process::ExecutionConfig;

const IDENTITY: [(&str, &str); 4] = [
    ("GIT_AUTHOR_NAME", "autover tests"),
    ("GIT_AUTHOR_EMAIL", "autover@example.com"),
    ("GIT_COMMITTER_NAME", "autover tests"),
    ("GIT_COMMITTER_EMAIL", "autover@example.com"),
];

/// Whether a usable `git` is on `PATH`
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Process settings that give git a committer identity
pub fn git_execution_config() -> ExecutionConfig {
    IDENTITY
        .iter()
        .fold(ExecutionConfig::new(), |config, (key, value)| {
            config.with_environment_variable(*key, *value)
        })
}

/// Run git in `dir` and return trimmed stdout, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(IDENTITY)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Working repository on `main` with one commit, plus a bare `origin`
pub struct GitFixture {
    _temp_dir: TempDir,
    pub work: PathBuf,
    pub remote: PathBuf,
}

impl GitFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let work = temp_dir.path().join("work");
        let remote = temp_dir.path().join("remote.git");
        std::fs::create_dir_all(&work).expect("Failed to create work dir");

        git(temp_dir.path(), &["init", "--bare", "remote.git"]);
        git(&work, &["init"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        git(&work, &["config", "tag.gpgsign", "false"]);
        std::fs::write(work.join("README.md"), "# scratch\n").expect("Failed to write README");
        git(&work, &["add", "-A"]);
        git(&work, &["commit", "-m", "initial"]);
        git(&work, &["branch", "-M", "main"]);
        git(&work, &["remote", "add", "origin", &remote.to_string_lossy()]);

        Self {
            _temp_dir: temp_dir,
            work,
            remote,
        }
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.work.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    pub fn current_branch(&self) -> String {
        git(&self.work, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn head(&self) -> String {
        git(&self.work, &["rev-parse", "HEAD"])
    }

    /// Branch names without `refs/heads/`; `refname:short` would print
    /// `heads/<name>` when a tag shares the name
    pub fn local_branches(&self) -> Vec<String> {
        lines(&git(&self.work, &["branch", "--format=%(refname:lstrip=2)"]))
    }

    pub fn local_tags(&self) -> Vec<String> {
        lines(&git(&self.work, &["tag", "--list"]))
    }

    pub fn remote_branches(&self) -> Vec<String> {
        lines(&git(&self.remote, &["branch", "--format=%(refname:lstrip=2)"]))
    }

    pub fn remote_tags(&self) -> Vec<String> {
        lines(&git(&self.remote, &["tag", "--list"]))
    }
}

fn lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
