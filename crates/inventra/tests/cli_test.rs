//! Integration tests for the `inventra` CLI binary.
//!
//! These tests validate argument parsing, help output, and the offline
//! data path -- all without requiring a live server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `inventra` binary with env isolation.
///
/// Points HOME/XDG at a nonexistent path and clears all `INVENTRA_*`
/// env vars so tests never touch the user's real configuration.
fn inventra_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("inventra");
    cmd.env("HOME", "/tmp/inventra-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/inventra-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/inventra-cli-test-nonexistent")
        .env_remove("INVENTRA_PROFILE")
        .env_remove("INVENTRA_SERVER")
        .env_remove("INVENTRA_DATA_DIR")
        .env_remove("INVENTRA_OUTPUT")
        .env_remove("INVENTRA_INSECURE")
        .env_remove("INVENTRA_TIMEOUT")
        .env_remove("INVENTRA_PASSWORD");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = inventra_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    inventra_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("inventory")
            .and(predicate::str::contains("products"))
            .and(predicate::str::contains("assets")),
    );
}

#[test]
fn test_version_flag() {
    inventra_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("inventra"));
}

// ── Offline data path ───────────────────────────────────────────────

#[test]
fn test_offline_add_and_list_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().to_str().unwrap();

    inventra_cmd()
        .args([
            "--data-dir",
            data_dir,
            "products",
            "add",
            "Router",
            "--stock",
            "5",
            "--min-stock",
            "10",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Added product Router"));

    inventra_cmd()
        .args(["--data-dir", data_dir, "--output", "json", "products", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Router")
                .and(predicate::str::contains("low_stock")),
        );
}

#[test]
fn test_offline_asset_circulation() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().to_str().unwrap();

    inventra_cmd()
        .args(["--data-dir", data_dir, "assets", "add", "Projector"])
        .assert()
        .success();

    let listing = inventra_cmd()
        .args(["--data-dir", data_dir, "--output", "plain", "assets", "list"])
        .output()
        .unwrap();
    let id = String::from_utf8_lossy(&listing.stdout).trim().to_owned();
    assert!(!id.is_empty(), "expected an asset id");

    inventra_cmd()
        .args([
            "--data-dir", data_dir, "assets", "borrow", &id, "--assignee", "kim",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("checked out to kim"));

    // Deleting a borrowed asset must fail with the guard's exit code.
    inventra_cmd()
        .args(["--data-dir", data_dir, "--yes", "assets", "delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid state transition"));

    inventra_cmd()
        .args(["--data-dir", data_dir, "assets", "return", &id])
        .assert()
        .success();

    inventra_cmd()
        .args(["--data-dir", data_dir, "--yes", "assets", "delete", &id])
        .assert()
        .success();
}

#[test]
fn test_status_offline() {
    let dir = tempfile::tempdir().unwrap();
    inventra_cmd()
        .args(["--data-dir", dir.path().to_str().unwrap(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"));
}

#[test]
fn test_analytics_requires_a_server() {
    let dir = tempfile::tempdir().unwrap();
    inventra_cmd()
        .args([
            "--data-dir",
            dir.path().to_str().unwrap(),
            "analytics",
            "overview",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No remote configured"));
}

#[test]
fn test_unknown_profile_errors() {
    inventra_cmd()
        .args(["--profile", "nope", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown profile"));
}
