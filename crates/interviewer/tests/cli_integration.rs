//! CLI integration tests for the interviewer command-line interface.
//!
//! These tests cover help output, argument parsing and the config commands.
//! None of them start a server.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the interviewer binary with an isolated config dir.
fn interviewer(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("interviewer").unwrap();
    cmd.env("INTERVIEWER_CONFIG_DIR", config_dir.path())
        .env_remove("GOOGLE_DRIVE_FOLDER_ID")
        .env_remove("GOOGLE_APPLICATION_CREDENTIALS")
        .env_remove("INTERVIEWER_CREDENTIALS_FILE")
        .env_remove("INTERVIEWER_PORT")
        .env_remove("INTERVIEWER_BIND")
        .env_remove("INTERVIEWER_STORAGE_TOKEN")
        .env_remove("INTERVIEWER_STORAGE_ENDPOINT")
        .current_dir(config_dir.path());
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("interview"))
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("interviewer"));
}

#[test]
fn test_start_help_lists_flags() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir)
        .args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--folder"));
}

#[test]
fn test_invalid_port_rejected() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir)
        .args(["start", "--port", "not-a-port"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_unknown_subcommand_rejected() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir).arg("frobnicate").assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Command Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_path_uses_config_dir() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_defaults() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 5000"))
        .stdout(predicate::str::contains("bind = \"127.0.0.1\""));
}

#[test]
fn test_config_show_reads_project_file_and_env() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("interviewer.toml"),
        "[server]\nport = 6100\n\n[storage]\nfolder_id = \"file-folder\"\n",
    )
    .unwrap();

    interviewer(&dir)
        .env("GOOGLE_DRIVE_FOLDER_ID", "env-folder")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 6100"))
        .stdout(predicate::str::contains("folder_id = \"env-folder\""));
}

#[test]
fn test_config_show_masks_token() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir)
        .env("INTERVIEWER_STORAGE_TOKEN", "super-secret")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("super-secret").not());
}

#[test]
fn test_config_show_warns_about_service_account_env() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir)
        .env("GOOGLE_APPLICATION_CREDENTIALS", "/etc/sa.json")
        .args(["config", "show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("GOOGLE_APPLICATION_CREDENTIALS is set but not used"))
        .stdout(predicate::str::contains("/etc/sa.json").not());
}

#[test]
fn test_config_which_lists_sources() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir)
        .args(["config", "which"])
        .assert()
        .success()
        .stdout(predicate::str::contains("interviewer.toml"));
}

#[test]
fn test_start_rejects_missing_config_file() {
    let dir = TempDir::new().unwrap();
    interviewer(&dir)
        .args(["start", "--config", "does-not-exist.toml"])
        .assert()
        .failure();
}
