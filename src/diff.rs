//! Comparison of generated artifacts with earlier versions
//!
//! Comparisons are advisory: they are logged or written to the working
//! directory, and never stop the pipeline.

use std::path::{Path, PathBuf};

use similar::{ChangeTag, TextDiff};

use crate::common::fs::{self as cfs, files_under};
use crate::context::RunContext;
use crate::error::Result;
use crate::error::warning::BundlerWarning;
use crate::kernels;

/// Line-level differences between two files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    pub from: PathBuf,
    pub to: PathBuf,
    pub inserted: usize,
    pub deleted: usize,
    /// Lines present in `to` only
    pub inserted_lines: Vec<String>,
    /// Lines present in `from` only
    pub removed_lines: Vec<String>,
    pub unified: String,
}

impl DiffReport {
    pub fn between(from: &Path, to: &Path) -> Result<Self> {
        let before = cfs::read_text(from)?;
        let after = cfs::read_text(to)?;
        let diff = TextDiff::from_lines(&before, &after);

        let mut inserted_lines = Vec::new();
        let mut removed_lines = Vec::new();
        for change in diff.iter_all_changes() {
            let line = change.value().trim_end().to_string();
            match change.tag() {
                ChangeTag::Insert => inserted_lines.push(line),
                ChangeTag::Delete => removed_lines.push(line),
                ChangeTag::Equal => {}
            }
        }

        let from_name = from.display().to_string();
        let to_name = to.display().to_string();
        let unified = diff
            .unified_diff()
            .context_radius(3)
            .header(&from_name, &to_name)
            .to_string();

        Ok(Self {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            inserted: inserted_lines.len(),
            deleted: removed_lines.len(),
            inserted_lines,
            removed_lines,
            unified,
        })
    }

    pub fn is_identical(&self) -> bool {
        self.inserted == 0 && self.deleted == 0
    }
}

/// Finds the comparable earlier artifact of a staged file
pub struct DiffValidator<'a> {
    ctx: &'a RunContext,
}

impl<'a> DiffValidator<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self { ctx }
    }

    /// Earlier artifact to compare `relative` with
    ///
    /// Tried in order: the same path in the archive, the latest archived
    /// file sharing the longest name prefix, then a sample file of the
    /// templates directory when there is no earlier release.
    pub fn find_comparable(&self, relative: &str) -> Option<PathBuf> {
        let (dir, name) = relative.rsplit_once('/').unwrap_or(("", relative));
        let exact = self.ctx.layout.archived(relative);
        Some(exact)
            .filter(|p| p.is_file())
            .or_else(|| widest_prefix_match(&self.ctx.layout.archived(dir), name))
            .or_else(|| {
                self.ctx
                    .layout
                    .templates_dir()
                    .filter(|_| !self.ctx.release.is_increment)
                    .and_then(|templates| widest_prefix_match(templates, name))
            })
    }

    /// Compare a staged file with its comparable artifact
    pub fn validate(&self, relative: &str) -> Result<Option<DiffReport>> {
        let staged = self.ctx.layout.staged(relative);
        let Some(comparable) = self.find_comparable(relative) else {
            BundlerWarning::lookup(
                format!("comparable file for {}", relative),
                "the comparison is skipped",
            )
            .emit();
            return Ok(None);
        };
        let report = DiffReport::between(&comparable, &staged)?;
        self.publish(&report)?;
        Ok(Some(report))
    }

    /// Log or write a report according to the diff mode
    pub fn publish(&self, report: &DiffReport) -> Result<()> {
        let to_name = cfs::file_name(&report.to);
        tracing::info!(
            "-- Comparing {} with {}: {} lines inserted, {} lines deleted.",
            to_name,
            cfs::file_name(&report.from),
            report.inserted,
            report.deleted
        );
        let Some(mode) = self.ctx.diff else {
            return Ok(());
        };
        if mode.logs() && !report.is_identical() {
            tracing::info!("\n{}", report.unified);
        }
        if mode.writes_files() {
            let path = self.report_path(&to_name);
            cfs::write_text(&path, &report.unified)?;
            tracing::info!("     Diff written to {}", path.display());
        }
        Ok(())
    }

    fn report_path(&self, to_name: &str) -> PathBuf {
        self.ctx
            .layout
            .working
            .join("diff")
            .join(format!("diff_{}.txt", to_name))
    }
}

/// Latest file of `dir` sharing the longest name prefix with `name`
///
/// The prefix grows one character at a time while some file with the same
/// extension still matches it.
pub fn widest_prefix_match(dir: &Path, name: &str) -> Option<PathBuf> {
    let extension = kernels::extension(name).unwrap_or("");
    let candidates: Vec<String> = files_under(dir)
        .into_iter()
        .filter(|file| !file.contains('/') && file != name)
        .filter(|file| kernels::extension(file).unwrap_or("") == extension)
        .collect();

    let mut best = None;
    for end in 1..name.len() {
        let Some(prefix) = name.get(..end) else {
            continue;
        };
        let latest = candidates.iter().filter(|c| c.starts_with(prefix)).max();
        match latest {
            Some(latest) => best = Some(latest),
            None => break,
        }
    }
    best.map(|file| dir.join(file))
}
