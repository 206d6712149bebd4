//! End-to-end CLI tests driving the compiled binary.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn ocm_demo() -> Command {
    Command::cargo_bin("ocm-demo").expect("binary built")
}

#[test]
fn test_help_lists_every_subcommand() {
    ocm_demo()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("setup")
                .and(predicate::str::contains("demo"))
                .and(predicate::str::contains("test"))
                .and(predicate::str::contains("list"))
                .and(predicate::str::contains("status"))
                .and(predicate::str::contains("cleanup")),
        );
}

#[test]
fn test_version_flag_prints_version() {
    ocm_demo()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_subcommand_fails() {
    ocm_demo()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn test_unknown_log_level_fails() {
    ocm_demo()
        .args(["status", "--log-level", "TRACE"])
        .assert()
        .failure();
}

#[test]
fn test_list_prints_sorted_examples_without_hidden_entries() {
    let root = tempfile::TempDir::new().expect("tempdir");
    let examples = root.path().join("examples");
    std::fs::create_dir_all(examples.join("02-transport")).unwrap();
    std::fs::create_dir_all(examples.join("01-basic")).unwrap();
    std::fs::create_dir_all(examples.join(".hidden")).unwrap();

    ocm_demo()
        .arg("list")
        .env("OCM_DEMO_PROJECT_ROOT", root.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("01-basic")
                .and(predicate::str::contains("02-transport"))
                .and(predicate::str::contains(".hidden").not()),
        );
}

#[test]
fn test_status_exits_zero_when_environment_not_ready() {
    let root = tempfile::TempDir::new().expect("tempdir");
    // A registry name no container carries and a port nothing listens on
    // guarantee the environment reports not-ready on any machine.
    ocm_demo()
        .args(["status", "--log-level", "ERROR"])
        .env("OCM_DEMO_PROJECT_ROOT", root.path())
        .env("OCM_DEMO_REGISTRY_NAME", "ocm-demo-status-test-absent")
        .env("OCM_DEMO_REGISTRY_PORT", "1")
        .assert()
        .success();
}

#[test]
fn test_list_with_no_examples_still_succeeds() {
    let root = tempfile::TempDir::new().expect("tempdir");
    ocm_demo()
        .arg("list")
        .env("OCM_DEMO_PROJECT_ROOT", root.path())
        .assert()
        .success();
}
