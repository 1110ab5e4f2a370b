//! CLI integration tests.

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use sessionvault::infrastructure::bootstrap::open_vault_database;

/// The binary with a clean environment, run from `dir` so no stray
/// `config.toml` or `.env` is picked up.
fn sessionvault(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("sessionvault");
    cmd.env_clear().current_dir(dir);
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    sessionvault(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sessionvault"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn check_config_accepts_environment_only_setup() {
    let dir = tempfile::tempdir().unwrap();
    sessionvault(dir.path())
        .args(["check", "config"])
        .env("OWNER_ID", "42")
        .env("UPLOAD_CHANNEL_ID", "-1001234")
        .env("BOT_TOKEN", "123456:ABCDEFGHIJ")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("backups are disabled"))
        .stdout(predicate::str::contains("ABCDEFGHIJ").not());
}

#[test]
fn check_config_reports_missing_owner() {
    let dir = tempfile::tempdir().unwrap();
    sessionvault(dir.path())
        .args(["check", "config"])
        .env("UPLOAD_CHANNEL_ID", "-1001234")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required field: OWNER_ID"));
}

#[test]
fn check_config_reads_a_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vault.toml");
    std::fs::write(
        &path,
        "[telegram]\nowner_id = 7\nupload_channel = \"@uploads\"\ndb_channel = \"-1002\"\n",
    )
    .unwrap();

    sessionvault(dir.path())
        .args(["--json", "check", "config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"owner_id\":7"))
        .stdout(predicate::str::contains("\"upload_channel\":\"@uploads\""))
        .stdout(predicate::str::contains("\"bot_token_present\":false"));
}

#[test]
fn stats_refuses_a_missing_database() {
    let dir = tempfile::tempdir().unwrap();
    sessionvault(dir.path())
        .args(["stats", "--db", "absent.sqlite3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("database not found"));
    assert!(!dir.path().join("absent.sqlite3").exists());
}

#[test]
fn stats_prints_counters_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vault.sqlite3");
    open_vault_database(&path.to_string_lossy()).unwrap();

    sessionvault(dir.path())
        .args(["--json", "stats", "--db"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_users\":0"))
        .stdout(predicate::str::contains("\"total_sessions\":0"));
}

#[test]
fn stats_renders_a_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vault.sqlite3");
    open_vault_database(&path.to_string_lossy()).unwrap();

    sessionvault(dir.path())
        .args(["--color", "never", "stats", "--db"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Active users (2d)"));
}
