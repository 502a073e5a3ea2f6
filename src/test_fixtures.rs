//! Test fixtures and utilities for reducing test setup duplication.
//!
//! [`MissionFixture`] lays out a throwaway mission under a temp directory:
//!
//! ```text
//! <root>/working    by-products of the runs
//! <root>/staging    staging area
//! <root>/bundle     archive parent; the archive root is bundle/maven_spice
//! <root>/kernels    the only kernel pool
//! <root>/templates  template overrides and diff samples
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let fixture = MissionFixture::new();
//! fixture.kernel_file("lsk/naif0012.tls", "KPL/LSK");
//! fixture.archive_file("bundle_maven_spice_v001.xml", "<Product_Bundle/>");
//! let ctx = fixture.context(ReleaseState::after(1));
//! ```

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::Config;
use crate::context::{DiffMode, Faucet, RunContext};
use crate::release::ReleaseState;

/// Setup file of the MAVEN test mission
pub const SAMPLE_CONFIG: &str = r"
mission:
  acronym: maven
  name: MAVEN
  start: 2013-11-18T00:00:00Z
  finish: 2030-01-01T00:00:00Z
identifiers:
  national_agency: nasa
  archiving_agency: pds
producer:
  author: Jane Doe
directories:
  working: working
  staging: staging
  bundle: bundle
  kernels: [kernels]
kernel_list:
  - pattern: 'naif[0-9]{4}\.tls'
    description: NAIF leapseconds kernel.
  - pattern: 'maven_v[0-9]{2}\.tm'
    description: MAVEN meta-kernel.
meta_kernel:
  grammar:
    - naif????.tls
    - 'date:maven_orb_*.bsp'
    - 'exclude:*_test.bsp'
coverage:
  maven_orb_20200101.bsp:
    start: 2020-01-01T00:00:00Z
    stop: 2020-02-01T00:00:00Z
eol: crlf
";

/// Parsed [`SAMPLE_CONFIG`] with its relative directories untouched
///
/// # Panics
///
/// Panics if the sample no longer parses.
#[must_use]
#[allow(clippy::expect_used)]
pub fn sample_config() -> Config {
    Config::from_yaml(SAMPLE_CONFIG).expect("sample config must parse")
}

/// Mission directories under a temp root
pub struct MissionFixture {
    root: TempDir,
}

impl MissionFixture {
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Sample config pointed at the fixture directories
    #[must_use]
    pub fn config(&self) -> Config {
        let root = self.root();
        let mut config = sample_config();
        config.directories.working = root.join("working");
        config.directories.staging = root.join("staging");
        config.directories.bundle = root.join("bundle");
        config.directories.kernels = vec![root.join("kernels")];
        config.directories.templates = Some(root.join("templates"));
        config
    }

    #[must_use]
    pub fn context(&self, release: ReleaseState) -> RunContext {
        RunContext::new(self.config(), release, None, None)
    }

    /// Context over a config adjusted by `adjust`
    pub fn context_with(
        &self,
        release: ReleaseState,
        adjust: impl FnOnce(&mut Config),
    ) -> RunContext {
        let mut config = self.config();
        adjust(&mut config);
        RunContext::new(config, release, None, None)
    }

    #[must_use]
    pub fn context_with_diff(&self, release: ReleaseState, diff: DiffMode) -> RunContext {
        RunContext::new(self.config(), release, None, Some(diff))
    }

    #[must_use]
    pub fn context_with_faucet(&self, release: ReleaseState, faucet: Faucet) -> RunContext {
        RunContext::new(self.config(), release, Some(faucet), None)
    }

    /// Write a file relative to the archive root `bundle/maven_spice`
    pub fn archive_file(&self, relative: &str, content: &str) -> PathBuf {
        self.write_input(&format!("bundle/maven_spice/{}", relative), content)
    }

    /// Write a file relative to the staging area
    pub fn staging_file(&self, relative: &str, content: &str) -> PathBuf {
        self.write_input(&format!("staging/{}", relative), content)
    }

    /// Write a file relative to the templates directory
    pub fn template_file(&self, relative: &str, content: &str) -> PathBuf {
        self.write_input(&format!("templates/{}", relative), content)
    }

    /// Write a file relative to the kernel pool
    pub fn kernel_file(&self, relative: &str, content: &str) -> PathBuf {
        self.write_input(&format!("kernels/{}", relative), content)
    }

    /// Write a file relative to the fixture root, creating its parents
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[allow(clippy::expect_used)]
    pub fn write_input(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write fixture file");
        path
    }
}
