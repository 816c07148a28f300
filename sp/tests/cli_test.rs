//! Command-line smoke tests for the `sp` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `sp` isolated from the user's config and log directories
fn sp(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sp").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"));
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    sp(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("host"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_prints_defaults() {
    let home = TempDir::new().unwrap();
    sp(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: manual"))
        .stdout(predicate::str::contains("delay-ms: 1000"))
        .stdout(predicate::str::contains("noun: subject"));
}

#[test]
fn test_config_reads_local_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join(".studyplanner.yml"),
        "save:\n  mode: auto\nitems:\n  noun: task\n",
    )
    .unwrap();

    sp(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: auto"))
        .stdout(predicate::str::contains("noun: task"));
}

#[test]
fn test_invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.yml");
    std::fs::write(&config, "items:\n  default-hours: 0.3\n").unwrap();

    sp(&home)
        .args(["--config", config.to_str().unwrap(), "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("default-hours"));
}

#[test]
fn test_rejects_unknown_save_mode() {
    let home = TempDir::new().unwrap();
    sp(&home)
        .args(["run", "--save-mode", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown save mode"));
}
