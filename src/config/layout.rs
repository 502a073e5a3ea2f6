//! Directory layout of a run
//!
//! The archive root is `<bundle>/<mission>_spice/`; the staging directory
//! mirrors it. By-products (plan, kernel list, file list, checksum registry,
//! diff reports) go to the working directory.

use std::path::{Path, PathBuf};

use super::Config;
use crate::context::RunType;

/// Resolved directories and naming rules for by-products
#[derive(Debug, Clone)]
pub struct Layout {
    pub working: PathBuf,
    pub staging: PathBuf,
    pub bundle: PathBuf,
    pub kernels: Vec<PathBuf>,
    pub templates: Option<PathBuf>,
    acronym: String,
}

impl Layout {
    pub fn new(config: &Config) -> Self {
        let dirs = &config.directories;
        Self {
            working: dirs.working.clone(),
            staging: dirs.staging.clone(),
            bundle: dirs.bundle.clone(),
            kernels: dirs.kernels.clone(),
            templates: dirs.templates.clone(),
            acronym: config.mission.acronym.clone(),
        }
    }

    pub fn acronym(&self) -> &str {
        &self.acronym
    }

    /// Final archive directory, `<bundle>/<mission>_spice`
    pub fn archive_root(&self) -> PathBuf {
        self.bundle.join(format!("{}_spice", self.acronym))
    }

    /// Path of an archive-relative file inside staging
    pub fn staged(&self, relative: &str) -> PathBuf {
        self.staging.join(relative)
    }

    /// Path of an archive-relative file inside the final archive
    pub fn archived(&self, relative: &str) -> PathBuf {
        self.archive_root().join(relative)
    }

    /// `<mission>_<run_type>_<NN>.<extension>`
    pub fn byproduct_name(&self, run_type: RunType, release: u32, extension: &str) -> String {
        format!(
            "{}_{}_{:02}.{}",
            self.acronym,
            run_type.as_str(),
            release,
            extension
        )
    }

    pub fn byproduct_path(&self, run_type: RunType, release: u32, extension: &str) -> PathBuf {
        self.working
            .join(self.byproduct_name(run_type, release, extension))
    }

    pub fn templates_dir(&self) -> Option<&Path> {
        self.templates.as_deref()
    }
}
