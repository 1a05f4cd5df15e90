#![allow(deprecated)] // TODO: move from Command::cargo_bin to the cargo_bin_cmd! macro

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn convoy() -> Command {
    let mut cmd = Command::cargo_bin("convoy").unwrap();
    cmd.env_remove("CONVOY_CONFIG_PATH")
        .env_remove("VULTR_API_URL")
        .env("VULTR_API_KEY", "test");
    cmd
}

#[test]
fn test_cli_help() {
    convoy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_cli_version() {
    convoy()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("convoy"));
}

#[test]
fn test_provision_help() {
    convoy()
        .args(["provision", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_invalid_command() {
    convoy().arg("invalid-command").assert().failure();
}

#[test]
fn test_unknown_tag_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("convoy.yml");
    fs::write(&path, "platform: vultr\nbogus:\n  - 1\n").unwrap();

    convoy()
        .arg("validate")
        .arg("--file")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bogus"))
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_unknown_platform_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("convoy.yml");
    fs::write(&path, "platform: digitalocean\nservers: []\n").unwrap();

    convoy()
        .args(["validate", "-f"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("digitalocean"));
}

#[test]
fn test_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    convoy()
        .args(["provision", "--dry-run", "--file"])
        .arg(dir.path().join("absent.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.yml"));
}

#[test]
fn test_no_file_in_directory_fails() {
    let dir = tempfile::tempdir().unwrap();

    convoy()
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no infrastructure file found"));
}

#[test]
fn test_missing_api_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("convoy.yml");
    fs::write(&path, "servers: []\n").unwrap();

    convoy()
        .env_remove("VULTR_API_KEY")
        .args(["validate", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("VULTR_API_KEY"));
}

#[test]
fn test_destroy_can_be_declined() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("convoy.yml");
    fs::write(&path, "servers: []\n").unwrap();

    convoy()
        .args(["destroy", "--file"])
        .arg(&path)
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted"));
}
