//! Binary smoke tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn autover() -> Command {
    let mut cmd = Command::cargo_bin("autover").unwrap();
    cmd.env_remove("RUST_LOG").arg("--no-color");
    cmd
}

#[test]
fn test_help_lists_commands() {
    autover()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("--interval-ms"));
}

#[test]
fn test_version() {
    autover()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_init_creates_settings_file() {
    let temp_dir = TempDir::new().unwrap();

    autover()
        .arg("-C")
        .arg(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains(".autover.yml"));

    let contents = std::fs::read_to_string(temp_dir.path().join(".autover.yml")).unwrap();
    assert!(contents.contains("debounce_ms: 5000"));
    assert!(contents.contains("branch_prefix: auto-version"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join(".autover.yml"), "remote: mirror\n").unwrap();

    autover()
        .arg("-C")
        .arg(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    autover()
        .arg("-C")
        .arg(temp_dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_watch_outside_repository_fails() {
    let temp_dir = TempDir::new().unwrap();

    autover()
        .arg("-C")
        .arg(temp_dir.path())
        .arg("watch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a git repository"));
}

#[test]
fn test_invalid_settings_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir(temp_dir.path().join(".git")).unwrap();
    std::fs::write(temp_dir.path().join(".autover.yml"), "debounce_ms: 0\n").unwrap();

    autover()
        .arg("-C")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation"));
}
