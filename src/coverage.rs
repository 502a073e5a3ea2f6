//! Time coverage of archived files
//!
//! Computing a kernel's coverage from its data segments is a numerical
//! concern handled outside the bundler; the pipeline only consumes it
//! through [`CoverageService`].

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed time interval in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        Self { start, stop }
    }

    /// Smallest interval containing both
    pub fn union(self, other: Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            stop: self.stop.max(other.stop),
        }
    }

    /// Smallest interval containing every interval of the iterator
    pub fn span(intervals: impl IntoIterator<Item = Interval>) -> Option<Interval> {
        intervals.into_iter().reduce(Interval::union)
    }

    /// Start time as rendered in labels
    pub fn start_label(&self) -> String {
        format_time(&self.start)
    }

    /// Stop time as rendered in labels
    pub fn stop_label(&self) -> String {
        format_time(&self.stop)
    }
}

/// ISO calendar format with a `Z` suffix and whole seconds
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Source of coverage intervals for archived files
pub trait CoverageService {
    /// Coverage of the file at `path`, `None` when it cannot be determined
    fn coverage(&self, path: &Path) -> Option<Interval>;
}

/// Coverage from the setup file
///
/// Files listed in the `coverage` table get their configured interval; any
/// other existing file is assumed to span the whole mission.
#[derive(Debug, Clone)]
pub struct ConfiguredCoverage {
    table: BTreeMap<String, Interval>,
    mission: Interval,
}

impl ConfiguredCoverage {
    pub fn new(table: BTreeMap<String, Interval>, mission: Interval) -> Self {
        Self { table, mission }
    }
}

impl CoverageService for ConfiguredCoverage {
    fn coverage(&self, path: &Path) -> Option<Interval> {
        if !path.is_file() {
            return None;
        }
        let name = path.file_name()?.to_string_lossy();
        Some(self.table.get(name.as_ref()).copied().unwrap_or(self.mission))
    }
}
