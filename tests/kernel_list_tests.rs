//! Kernel list validation through the `-k` option

mod common;

use common::TestWorkspace;
use predicates::prelude::*;

const HEADER: &str = "DATE = 2024-06-01\nSPACECRAFT = MAVEN\nEOH\n\n";

fn record(file: &str, description: Option<&str>) -> String {
    let mut text = format!("FILE             = {}\nMAKLABEL_OPTIONS =\n", file);
    if let Some(description) = description {
        text.push_str(&format!("DESCRIPTION      = {}\n", description));
    }
    text
}

#[test]
fn test_count_mismatch_fails() {
    let workspace = TestWorkspace::new();
    workspace.add_kernel("lsk/naif0012.tls", "KPL/LSK\n");
    workspace.write_file(
        "maven.kernel_list",
        &format!("{}{}", HEADER, record("spice_kernels/lsk/naif0012.tls", None)),
    );

    workspace
        .bundler()
        .args(["run", "maven.yaml", "-k", "maven.kernel_list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "does not have the same number of entries",
        ));

    assert!(!workspace.file_exists("staging/spice_kernels"));
}

#[test]
fn test_duplicate_kernels_fail() {
    let workspace = TestWorkspace::new();
    workspace.add_kernel("lsk/naif0012.tls", "KPL/LSK\n");
    let lsk = record("spice_kernels/lsk/naif0012.tls", Some("Leapseconds."));
    workspace.write_file("maven.kernel_list", &format!("{}{}{}", HEADER, lsk, lsk));

    workspace
        .bundler()
        .args(["run", "maven.yaml", "-k", "maven.kernel_list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Kernel list contains duplicates"))
        .stderr(predicate::str::contains("naif0012.tls"));
}

#[test]
fn test_duplicates_across_releases_fail() {
    let workspace = TestWorkspace::new();
    workspace.add_kernel("lsk/naif0012.tls", "KPL/LSK\n");
    workspace
        .bundler()
        .args(["run", "maven.yaml"])
        .assert()
        .success();

    workspace
        .bundler()
        .args(["run", "maven.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Kernel list contains duplicates"));
}

#[test]
fn test_provided_list_is_used() {
    let workspace = TestWorkspace::new();
    workspace.add_kernel("lsk/naif0012.tls", "KPL/LSK\n");
    workspace.write_file(
        "maven.kernel_list",
        &format!(
            "{}{}",
            HEADER,
            record("spice_kernels/lsk/naif0012.tls", Some("Leapseconds."))
        ),
    );

    workspace
        .bundler()
        .args(["run", "maven.yaml", "-k", "maven.kernel_list", "-f", "list"])
        .assert()
        .success();

    let copied = workspace.read_file("working/maven_release_01.kernel_list");
    assert!(copied.contains("DESCRIPTION      = Leapseconds."));
    assert!(!workspace.file_exists("working/maven_release_01.plan"));
}

#[test]
fn test_kernel_missing_from_pools_fails() {
    let workspace = TestWorkspace::new();
    workspace.write_file(
        "maven.kernel_list",
        &format!(
            "{}{}",
            HEADER,
            record("spice_kernels/lsk/naif0099.tls", Some("Leapseconds."))
        ),
    );

    workspace
        .bundler()
        .args(["run", "maven.yaml", "-k", "maven.kernel_list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Kernel naif0099.tls not present in any kernel directory",
        ));
}
