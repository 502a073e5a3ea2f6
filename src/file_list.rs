//! Record of every file a run produces
//!
//! The file list is what a later `clear` run reads to roll a run back, so it
//! must exist even when the run fails halfway.
//!
//! ## Usage
//!
//! ```ignore
//! let mut file_list = FileList::new(ctx.layout.byproduct_path(..., "file_list"));
//!
//! // Produce files...
//! file_list.record("spice_kernels/lsk/naif0012.tls");
//! file_list.record_byproduct("maven_release_03.plan");
//!
//! // On success:
//! file_list.commit()?;
//!
//! // On error the list is written when dropped.
//! ```

use std::path::{Path, PathBuf};

use crate::common::fs as cfs;
use crate::error::{Result, config as config_err};

/// Prefix of entries that live in the working directory
pub const BYPRODUCT_PREFIX: &str = "working_directory/";

/// Produced files, relative to the archive root, in production order
#[derive(Debug)]
pub struct FileList {
    /// Destination of the list, absent for lists that are never written
    path: Option<PathBuf>,

    entries: Vec<String>,

    /// Whether the list has been written already
    written: bool,
}

impl FileList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            entries: Vec::new(),
            written: false,
        }
    }

    /// List that is never written
    #[cfg(test)]
    pub fn detached() -> Self {
        Self {
            path: None,
            entries: Vec::new(),
            written: false,
        }
    }

    /// Record a produced file; repeated entries are kept once
    pub fn record(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        if !self.entries.contains(&entry) {
            tracing::debug!("Recorded {}", entry);
            self.entries.push(entry);
        }
    }

    /// Record a by-product of the working directory
    pub fn record_byproduct(&mut self, name: &str) {
        self.record(format!("{}{}", BYPRODUCT_PREFIX, name));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the list, returning whether anything was written
    pub fn commit(mut self) -> Result<bool> {
        self.write()
    }

    fn write(&mut self) -> Result<bool> {
        self.written = true;
        let Some(path) = self.path.as_deref() else {
            return Ok(false);
        };
        if self.entries.is_empty() {
            tracing::debug!("No files produced; {} not written", path.display());
            return Ok(false);
        }
        let mut text = self.entries.join("\n");
        text.push('\n');
        cfs::write_text(path, &text)?;
        tracing::info!("-- File list written to {}", path.display());
        Ok(true)
    }

    /// Entries of a file list written by an earlier run
    pub fn read(path: &Path) -> Result<Vec<String>> {
        if !path.is_file() {
            return Err(config_err::invalid(format!(
                "file list {} does not exist",
                path.display()
            )));
        }
        Ok(cfs::read_text(path)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl Drop for FileList {
    fn drop(&mut self) {
        if !self.written {
            // The run failed: keep what was produced so it can be cleared
            if let Err(e) = self.write() {
                tracing::error!("Failed to write file list: {}", e);
            }
        }
    }
}
