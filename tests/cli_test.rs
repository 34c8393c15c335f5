//! CLI integration tests using assert_cmd.
//!
//! These tests verify that the CLI interface works correctly.

mod common;

use assert_cmd::cargo_bin_cmd;
use common::TestContext;
use predicates::prelude::*;

#[test]
fn test_cli_help_flag() {
    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Register DuckDB secrets"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("--version").assert().success();
}

#[test]
fn test_cli_invalid_command() {
    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("nonexistent-command").assert().failure();
}

#[test]
fn test_missing_key_id_aborts_before_registration() {
    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("demo")
        .env_remove("ACCESS_KEY")
        .env("SECRET_KEY", "xxx")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "required environment variable ACCESS_KEY is not set",
        ))
        .stderr(predicate::str::contains("Trying to set DuckDB secret").not());
}

#[test]
fn test_empty_secret_is_a_configuration_error() {
    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("register")
        .env("ACCESS_KEY", "AKIA...")
        .env("SECRET_KEY", "")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SECRET_KEY"))
        .stdout(predicate::str::contains("Secret 's3_secret'").not());
}

#[test]
fn test_config_selects_env_var_names() {
    let ctx = TestContext::new().unwrap();
    let config = ctx
        .create_config("DUCK_TEST_KEY_ID", "DUCK_TEST_SECRET")
        .unwrap();

    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("--config")
        .arg(&config)
        .arg("query")
        .env_remove("DUCK_TEST_KEY_ID")
        .env_remove("DUCK_TEST_SECRET")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DUCK_TEST_KEY_ID"));
}

#[test]
fn test_missing_config_file_is_fatal() {
    let ctx = TestContext::new().unwrap();

    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("--config")
        .arg(ctx.path("does-not-exist.yaml"))
        .arg("register")
        .env("ACCESS_KEY", "AKIA...")
        .env("SECRET_KEY", "xxx")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_invalid_config_is_fatal() {
    let ctx = TestContext::new().unwrap();
    let config = ctx
        .create_file("bad.yaml", "secret:\n  name: not-an-identifier\n")
        .unwrap();

    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("--config")
        .arg(&config)
        .arg("register")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration validation failed"));
}

#[test]
fn test_doctor_passes_with_credentials() {
    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("doctor")
        .env("ACCESS_KEY", "AKIA...")
        .env("SECRET_KEY", "xxx")
        .assert()
        .success()
        .stdout(predicate::str::contains("Duck Secrets Doctor"))
        .stdout(predicate::str::contains("DuckDB v"))
        .stdout(predicate::str::contains("All checks passed"));
}

#[test]
fn test_doctor_reports_missing_credentials() {
    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("doctor")
        .env_remove("ACCESS_KEY")
        .env_remove("SECRET_KEY")
        .assert()
        .failure()
        .stdout(predicate::str::contains("$ACCESS_KEY is not set"))
        .stdout(predicate::str::contains("$SECRET_KEY is not set"));
}

#[test]
#[ignore]
fn test_register_prints_created() {
    // Needs the httpfs extension
    let mut cmd = cargo_bin_cmd!("duck-secrets");
    cmd.arg("register")
        .env("ACCESS_KEY", "AKIA...")
        .env("SECRET_KEY", "xxx")
        .assert()
        .success()
        .stdout(predicate::str::contains("Secret 's3_secret': created"));
}
