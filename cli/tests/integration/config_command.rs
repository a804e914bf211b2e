//! Integration tests for `vmagent config` command.
//!
//! All filesystem-touching tests set `VMAGENT_CONFIG` to a temp path so they
//! never read or write `~/.vmagent/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn vmagent() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vmagent"));
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

// ---------------------------------------------------------------------------
// `vmagent config show`
// ---------------------------------------------------------------------------

#[test]
fn test_config_show_no_config_file_uses_defaults() {
    let (_dir, path) = temp_config_path();
    vmagent()
        .args(["config", "show"])
        .env("VMAGENT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("cloud.resource_group"))
        .stdout(predicate::str::contains("vmagent-rg"))
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn test_config_show_displays_env_var_label() {
    let (_dir, path) = temp_config_path();
    vmagent()
        .args(["config", "show"])
        .env("VMAGENT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("VMAGENT_CONFIG"));
}

#[test]
fn test_config_show_does_not_create_file() {
    let (dir, path) = temp_config_path();
    vmagent()
        .args(["config", "show"])
        .env("VMAGENT_CONFIG", &path)
        .assert()
        .success();
    assert!(!dir.path().join("config.yaml").exists());
}

#[test]
fn test_config_show_json() {
    let (_dir, path) = temp_config_path();
    let output = vmagent()
        .args(["--json", "config", "show"])
        .env("VMAGENT_CONFIG", &path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["path"], path.as_str());
    assert_eq!(json["settings"]["cloud"]["name"], "default");
    assert_eq!(json["settings"]["cloud"]["resource_group"], "vmagent-rg");
}

// ---------------------------------------------------------------------------
// `vmagent config set`
// ---------------------------------------------------------------------------

#[test]
fn test_config_set_persists_value() {
    let (_dir, path) = temp_config_path();
    vmagent()
        .args(["config", "set", "cloud.resource_group", "build-agents"])
        .env("VMAGENT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("cloud.resource_group"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("build-agents"));

    vmagent()
        .args(["config", "show"])
        .env("VMAGENT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("build-agents"));
}

#[test]
fn test_config_set_trims_value() {
    let (_dir, path) = temp_config_path();
    vmagent()
        .args(["config", "set", "cloud.name", "  prod  "])
        .env("VMAGENT_CONFIG", &path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("name: prod\n"));
}

#[cfg(unix)]
#[test]
fn test_config_set_writes_owner_only_file() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, path) = temp_config_path();
    vmagent()
        .args(["config", "set", "cloud.subscription_id", "sub-123"])
        .env("VMAGENT_CONFIG", &path)
        .assert()
        .success();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_config_set_unknown_key_fails() {
    let (dir, path) = temp_config_path();
    vmagent()
        .args(["config", "set", "cloud.region", "westus"])
        .env("VMAGENT_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting: cloud.region"))
        .stderr(predicate::str::contains("cloud.resource_group"));
    assert!(!dir.path().join("config.yaml").exists());
}

#[test]
fn test_config_set_invalid_resource_group_fails() {
    let (_dir, path) = temp_config_path();
    vmagent()
        .args(["config", "set", "cloud.resource_group", "bad group!"])
        .env("VMAGENT_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for cloud.resource_group"));
}

#[test]
fn test_config_set_blank_value_fails() {
    let (_dir, path) = temp_config_path();
    vmagent()
        .args(["config", "set", "cloud.name", "   "])
        .env("VMAGENT_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be blank"));
}

#[test]
fn test_config_set_unknown_key_json_error() {
    let (_dir, path) = temp_config_path();
    let output = vmagent()
        .args(["--json", "config", "set", "cloud.region", "westus"])
        .env("VMAGENT_CONFIG", &path)
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["error"], true);
    assert_eq!(json["code"], "invalid_setting");
}
