//! Read-only state shared by every phase of a run
//!
//! [`RunContext`] is built once, after the release has been resolved, and
//! only ever borrowed immutably. The two mutable ledgers of a run live
//! elsewhere and each has a single owner:
//! - [`crate::file_list::FileList`], mutated by the phases that produce files
//! - [`crate::checksum::ChecksumRegistry`], mutated by the checksum registrar

use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

use crate::config::{Config, Layout};
use crate::coverage::{ConfiguredCoverage, CoverageService};
use crate::release::ReleaseState;

/// Pipeline checkpoint at which a run may stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Faucet {
    /// Stop after clearing a previous run
    Clear,
    /// Stop after writing or reading the release plan
    Plan,
    /// Stop after writing or reading the kernel list
    List,
    /// Stop once every product is in the staging area
    Staging,
    /// Stop once the staging area is copied to the archive
    Bundle,
    /// Stop once the kernels and meta-kernels are staged with their labels
    /// and copied to the archive; no inventories or checksums
    Labels,
}

/// Diff report destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffMode {
    /// Write unified diffs under `<working>/diff/`
    Files,
    /// Print unified diffs in the run log
    Log,
    /// Both
    All,
}

impl DiffMode {
    pub fn writes_files(self) -> bool {
        matches!(self, Self::Files | Self::All)
    }

    pub fn logs(self) -> bool {
        matches!(self, Self::Log | Self::All)
    }
}

/// Kind of run, part of every by-product name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
    Release,
    Labels,
}

impl RunType {
    pub fn from_faucet(faucet: Option<Faucet>) -> Self {
        if faucet == Some(Faucet::Labels) {
            Self::Labels
        } else {
            Self::Release
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Labels => "labels",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable run state
pub struct RunContext {
    pub config: Config,
    pub layout: Layout,
    pub release: ReleaseState,
    pub run_type: RunType,
    pub faucet: Option<Faucet>,
    pub diff: Option<DiffMode>,
    pub coverage: Box<dyn CoverageService>,
}

impl RunContext {
    pub fn new(
        config: Config,
        release: ReleaseState,
        faucet: Option<Faucet>,
        diff: Option<DiffMode>,
    ) -> Self {
        let layout = Layout::new(&config);
        let coverage = Box::new(ConfiguredCoverage::new(
            config.coverage.clone(),
            config.mission_interval(),
        ));
        Self {
            config,
            layout,
            release,
            run_type: RunType::from_faucet(faucet),
            faucet,
            diff,
            coverage,
        }
    }

    /// Replace the coverage service
    #[cfg(test)]
    pub fn with_coverage(mut self, coverage: Box<dyn CoverageService>) -> Self {
        self.coverage = coverage;
        self
    }

    pub fn stops_at(&self, faucet: Faucet) -> bool {
        self.faucet == Some(faucet)
    }

    /// `<mission>_<run_type>_<NN>.<extension>` for this run
    pub fn byproduct_name(&self, extension: &str) -> String {
        self.layout
            .byproduct_name(self.run_type, self.release.new_release, extension)
    }

    pub fn acronym(&self) -> &str {
        &self.config.mission.acronym
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::sample_config;

    #[test]
    fn test_run_type_from_faucet() {
        assert_eq!(RunType::from_faucet(None), RunType::Release);
        assert_eq!(RunType::from_faucet(Some(Faucet::Staging)), RunType::Release);
        assert_eq!(RunType::from_faucet(Some(Faucet::Labels)), RunType::Labels);
    }

    #[test]
    fn test_diff_mode_destinations() {
        assert!(DiffMode::All.logs() && DiffMode::All.writes_files());
        assert!(DiffMode::Log.logs() && !DiffMode::Log.writes_files());
        assert!(!DiffMode::Files.logs() && DiffMode::Files.writes_files());
    }

    #[test]
    fn test_context_byproduct_name() {
        let ctx = RunContext::new(
            sample_config(),
            ReleaseState::first(),
            Some(Faucet::Labels),
            None,
        );
        assert!(ctx.stops_at(Faucet::Labels));
        assert_eq!(ctx.byproduct_name("plan"), "maven_labels_01.plan");
    }
}
