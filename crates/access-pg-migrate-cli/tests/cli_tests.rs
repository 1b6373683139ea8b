//! CLI integration tests for access-pg-migrate.
//!
//! These tests cover argument parsing, help output and exit codes for
//! errors caught before any database is contacted.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the access-pg-migrate binary.
fn cmd() -> Command {
    Command::cargo_bin("access-pg-migrate").unwrap()
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("to-postgres"))
        .stdout(predicate::str::contains("to-access"));
}

#[test]
fn test_global_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("--no-progress"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_to_postgres_help() {
    cmd()
        .args(["to-postgres", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<ACCESS_FILES>..."))
        .stdout(predicate::str::contains("--host"))
        .stdout(predicate::str::contains("-H"))
        .stdout(predicate::str::contains("--database"))
        .stdout(predicate::str::contains("--username"))
        .stdout(predicate::str::contains("--password"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--schema"));
}

#[test]
fn test_to_access_help() {
    cmd()
        .args(["to-access", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<TABLES>..."))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--template"))
        .stdout(predicate::str::contains("--host"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("access-pg-migrate"));
}

// =============================================================================
// Exit Code Tests - Config Errors (Exit Code 2)
// =============================================================================

#[test]
fn test_to_postgres_without_files_exits_with_code_2() {
    cmd().arg("to-postgres").assert().code(2);
}

#[test]
fn test_to_access_without_tables_exits_with_code_2() {
    cmd().arg("to-access").assert().code(2);
}

#[test]
fn test_invalid_yaml_exits_with_code_2() {
    let file = config_file("postgres: [unclosed\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap()])
        .args(["to-postgres", "customers.accdb"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("YAML"));
}

#[test]
fn test_invalid_ssl_mode_exits_with_code_2() {
    let file = config_file("postgres:\n  ssl_mode: sometimes\n");

    cmd()
        .args(["-c", file.path().to_str().unwrap()])
        .args(["to-postgres", "customers.accdb"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ssl_mode"));
}

#[test]
fn test_empty_host_override_exits_with_code_2() {
    cmd()
        .args(["to-postgres", "customers.accdb", "-H", ""])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("host"));
}

#[test]
fn test_unknown_log_format_exits_with_code_2() {
    cmd()
        .args(["--log-format", "xml", "to-postgres", "customers.accdb"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("log format"));
}

// =============================================================================
// Exit Code Tests - Runtime Errors (Exit Code 1)
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_1() {
    cmd()
        .args(["--config", "nonexistent_config_file.yaml"])
        .args(["to-postgres", "customers.accdb"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("IO error"));
}

// =============================================================================
// Feature Tests
// =============================================================================

#[cfg(not(feature = "access"))]
#[test]
fn test_access_source_requires_feature() {
    cmd()
        .args(["--dry-run", "to-postgres", "customers.accdb"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--features access"));
}

#[test]
fn test_short_config_flag() {
    cmd()
        .args(["-c", "some_config.yaml", "--help"])
        .assert()
        .success();
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
