//! Common test utilities for spice-bundler integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Setup file of the test mission, with directories relative to it
pub const SETUP: &str = r"
mission:
  acronym: maven
  name: MAVEN
  observer: MAVEN
  start: 2013-11-18T00:00:00Z
  finish: 2030-01-01T00:00:00Z
identifiers:
  national_agency: nasa
  archiving_agency: pds
producer:
  author: Jane Doe
  email: jane.doe@example.com
directories:
  working: working
  staging: staging
  bundle: bundle
  kernels: [kernels]
kernel_list:
  - pattern: 'naif[0-9]{4}\.tls'
    description: NAIF leapseconds kernel.
  - pattern: 'maven_orb_[0-9]{8}\.bsp'
    description: MAVEN orbit reconstruction.
    options: MAVEN_ORB
coverage:
  maven_orb_20200101.bsp:
    start: 2020-01-01T00:00:00Z
    stop: 2020-02-01T00:00:00Z
release_date: 2024-06-01
";

/// A mission directory for integration tests
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the mission root, holding `maven.yaml`
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a mission directory with the default setup file
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        let workspace = Self { temp, path };
        workspace.write_file("maven.yaml", SETUP);
        workspace
    }

    /// Write a file in the mission directory
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Write a kernel into the kernel pool
    pub fn add_kernel(&self, relative: &str, content: &str) {
        self.write_file(&format!("kernels/{}", relative), content);
    }

    /// Remove a kernel from the kernel pool
    #[allow(dead_code)]
    pub fn remove_kernel(&self, relative: &str) {
        std::fs::remove_file(self.path.join("kernels").join(relative))
            .expect("Failed to remove kernel");
    }

    /// Read a file from the mission directory
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in the mission directory
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Check if a file exists in the archive root
    #[allow(dead_code)]
    pub fn archived(&self, relative: &str) -> bool {
        self.file_exists(&format!("bundle/maven_spice/{}", relative))
    }

    /// Bundler command running in the mission directory
    #[allow(deprecated)]
    pub fn bundler(&self) -> Command {
        let mut cmd = Command::cargo_bin("spice-bundler").expect("binary must build");
        cmd.current_dir(&self.path).env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
