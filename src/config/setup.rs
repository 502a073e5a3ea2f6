//! Mission setup file data structures
//!
//! Optional groups are plain `Option` fields; absent groups switch the
//! corresponding feature off.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::coverage::Interval;
use crate::error::{Result, config as config_err};

/// Mission setup (e.g. `maven.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub mission: MissionConfig,

    pub identifiers: IdentifiersConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<ProducerConfig>,

    pub directories: DirectoriesConfig,

    /// Ordered kernel name patterns with their kernel list fields
    #[serde(default)]
    pub kernel_list: Vec<KernelPattern>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_kernel: Option<MetaKernelConfig>,

    /// Explicit coverage per file name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub coverage: BTreeMap<String, Interval>,

    /// SPICE archive description source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spiceds: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,

    #[serde(default)]
    pub eol: LineEnding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissionConfig {
    /// Lower-case acronym used in file names and LIDs
    pub acronym: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observer: Option<String>,
    pub start: DateTime<Utc>,
    pub finish: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentifiersConfig {
    pub national_agency: String,
    pub archiving_agency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProducerConfig {
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoriesConfig {
    pub working: PathBuf,
    pub staging: PathBuf,
    pub bundle: PathBuf,
    pub kernels: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<PathBuf>,
}

/// One kernel list entry: a regex over kernel file names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KernelPattern {
    pub pattern: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetaKernelConfig {
    /// Grammar tokens, optionally `date:` or `exclude:` qualified
    #[serde(default)]
    pub grammar: Vec<String>,
    /// Pre-built meta-kernel used verbatim instead of generating one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    /// Kernels whose coverage defines the increment interval
    #[serde(default)]
    pub coverage_kernels: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }

    /// Record delimiter as named in PDS4 labels
    pub fn pds4_name(self) -> &'static str {
        match self {
            Self::Lf => "Line-Feed",
            Self::Crlf => "Carriage-Return Line-Feed",
        }
    }
}

impl Config {
    /// Parse a setup from a YAML string
    #[cfg(test)]
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Read, parse and validate a setup file
    ///
    /// Relative directories are resolved against the directory holding
    /// the setup file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(config_err::not_found(path.display().to_string()));
        }
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| config_err::parse_failed(path.display().to_string(), e.to_string()))?;
        let mut config: Self = serde_yaml::from_str(&yaml)
            .map_err(|e| config_err::parse_failed(path.display().to_string(), e.to_string()))?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let base = dunce::canonicalize(&base).unwrap_or(base);
        config.resolve_paths(&base);
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        let dirs = &mut self.directories;
        resolve(&mut dirs.working);
        resolve(&mut dirs.staging);
        resolve(&mut dirs.bundle);
        dirs.kernels.iter_mut().for_each(resolve);
        if let Some(t) = dirs.templates.as_mut() {
            resolve(t);
        }
        if let Some(mk) = self.meta_kernel.as_mut().and_then(|m| m.input.as_mut()) {
            resolve(mk);
        }
        if let Some(s) = self.spiceds.as_mut() {
            resolve(s);
        }
    }

    /// Check semantic constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        let acronym = &self.mission.acronym;
        if acronym.is_empty() || acronym.contains(char::is_whitespace) {
            return Err(config_err::invalid(format!(
                "mission acronym '{}' must be a non-empty word",
                acronym
            )));
        }
        if self.mission.start > self.mission.finish {
            return Err(config_err::invalid(
                "mission start is after mission finish",
            ));
        }
        if self.directories.kernels.is_empty() {
            return Err(config_err::invalid(
                "at least one kernels directory is required",
            ));
        }
        for entry in &self.kernel_list {
            regex::Regex::new(&entry.pattern).map_err(|e| {
                config_err::invalid(format!("kernel_list pattern '{}': {}", entry.pattern, e))
            })?;
            if entry.description.trim().is_empty() {
                return Err(config_err::invalid(format!(
                    "kernel_list pattern '{}' has an empty description",
                    entry.pattern
                )));
            }
        }
        for (name, interval) in &self.coverage {
            if interval.start > interval.stop {
                return Err(config_err::invalid(format!(
                    "coverage of {} starts after it stops",
                    name
                )));
            }
        }
        if let Some(mk) = &self.meta_kernel {
            crate::metakernel::Grammar::parse(&mk.grammar)?;
            for pattern in &mk.coverage_kernels {
                regex::Regex::new(pattern)?;
            }
        }
        Ok(())
    }

    /// Whole-mission interval
    pub fn mission_interval(&self) -> Interval {
        Interval::new(self.mission.start, self.mission.finish)
    }

    /// LID of the bundle, prefix of every product LID
    pub fn bundle_lid(&self) -> String {
        format!(
            "urn:{}:{}:{}.spice",
            self.identifiers.national_agency, self.identifiers.archiving_agency, self.mission.acronym
        )
    }

    pub fn author(&self) -> &str {
        self.producer.as_ref().map_or("N/A", |p| p.author.as_str())
    }

    /// Release date, today unless configured
    pub fn release_date(&self) -> NaiveDate {
        self.release_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}
