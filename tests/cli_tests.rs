//! CLI integration tests using the real spice-bundler binary

mod common;

use common::TestWorkspace;
use predicates::prelude::*;

#[test]
fn test_help_output() {
    TestWorkspace::new()
        .bundler()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SPICE"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("clear"))
        .stdout(predicate::str::contains("release"));
}

#[test]
fn test_version_output() {
    TestWorkspace::new()
        .bundler()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("spice-bundler"))
        .stdout(predicate::str::contains("Build info"));
}

#[test]
fn test_completions_bash() {
    TestWorkspace::new()
        .bundler()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spice-bundler"));
}

#[test]
fn test_completions_unknown_shell() {
    TestWorkspace::new()
        .bundler()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Invalid configuration: unknown shell"));
}

#[test]
fn test_missing_config() {
    TestWorkspace::new()
        .bundler()
        .args(["run", "missing.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: Configuration file not found",
        ));
}

#[test]
fn test_unknown_config_key() {
    let workspace = TestWorkspace::new();
    workspace.write_file(
        "broken.yaml",
        &format!("{}unexpected: true\n", common::SETUP),
    );
    workspace
        .bundler()
        .args(["release", "broken.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse configuration file"));
}

#[test]
fn test_unknown_faucet_rejected() {
    TestWorkspace::new()
        .bundler()
        .args(["run", "maven.yaml", "-f", "upload"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'upload'"));
}

#[test]
fn test_release_of_empty_archive() {
    TestWorkspace::new()
        .bundler()
        .args(["release", "maven.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MAVEN release 001 (first release)"));
}

#[test]
fn test_release_json() {
    TestWorkspace::new()
        .bundler()
        .args(["release", "maven.yaml", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"new_release\": 1"))
        .stdout(predicate::str::contains("\"is_increment\": false"));
}

#[test]
fn test_log_file_receives_debug_output() {
    let workspace = TestWorkspace::new();
    workspace
        .bundler()
        .args(["-s", "--log-file", "logs/run.log", "release", "maven.yaml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Generating release 001").not());

    let log = workspace.read_file("logs/run.log");
    assert!(log.contains("Generating release 001"));
    assert!(!log.contains("\x1b["));
}
