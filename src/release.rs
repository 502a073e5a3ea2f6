//! Release number resolution
//!
//! Decides which release a run produces and whether it extends an
//! existing archive. Sources are tried in priority order:
//! 1. the file list of a previous run being cleared
//! 2. bundle labels `bundle_*_v<NNN>.*` in the archive root
//! 3. kernel lists `*_release_<NNN>.*` in the working directory
//! 4. otherwise, the first release
//!
//! A name that matches a tier but cannot be parsed is logged and the
//! next tier is tried.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::common::pattern::static_regex;
use crate::config::Layout;
use crate::error::Result;

static BUNDLE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"^bundle_.*_v(\d+)\.[^.]+$"));

static RELEASE_MANIFEST: LazyLock<Regex> = LazyLock::new(|| static_regex(r"_release_(\d+)\."));

static TRAILING_NUMBER: LazyLock<Regex> = LazyLock::new(|| static_regex(r"(\d+)$"));

/// Release numbers of this run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReleaseState {
    /// Latest published release, absent for the first release
    pub current_release: Option<u32>,
    pub new_release: u32,
    pub is_increment: bool,
}

impl ReleaseState {
    pub fn first() -> Self {
        Self {
            current_release: None,
            new_release: 1,
            is_increment: false,
        }
    }

    /// Increment on top of `current`
    pub fn after(current: u32) -> Self {
        Self {
            current_release: Some(current),
            new_release: current + 1,
            is_increment: true,
        }
    }

    /// New release rendered with three digits
    pub fn label(&self) -> String {
        format!("{:03}", self.new_release)
    }

    pub fn current_label(&self) -> Option<String> {
        self.current_release.map(|r| format!("{:03}", r))
    }
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current_label() {
            Some(current) => write!(f, "release {} (increment of {})", self.label(), current),
            None => write!(f, "release {} (first release)", self.label()),
        }
    }
}

/// Resolve the release from directory listings
///
/// `prior_bundle` holds the file names of the archive root,
/// `prior_manifests` those of the working directory and
/// `override_manifest` the name of a file list being cleared.
pub fn resolve(
    prior_bundle: &[String],
    prior_manifests: &[String],
    override_manifest: Option<&str>,
) -> ReleaseState {
    override_manifest
        .and_then(from_override)
        .or_else(|| from_bundle_labels(prior_bundle))
        .or_else(|| from_manifests(prior_manifests))
        .unwrap_or_else(|| {
            tracing::warn!("     This is the first release.");
            ReleaseState::first()
        })
}

/// Resolve the release from the directories of `layout`
pub fn resolve_from_disk(layout: &Layout, clear: Option<&Path>) -> Result<ReleaseState> {
    tracing::info!("-- Checking existence of previous release.");
    let bundle = list_file_names(&layout.archive_root())?;
    let manifests = list_file_names(&layout.working)?;
    let clear_name = clear
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned());

    let state = resolve(&bundle, &manifests, clear_name.as_deref());
    tracing::info!("     Generating {}.", state);
    Ok(state)
}

fn from_override(name: &str) -> Option<ReleaseState> {
    let stem = name.strip_suffix(".file_list").unwrap_or(name);
    let parsed = TRAILING_NUMBER
        .captures(stem)
        .and_then(|c| c[1].parse::<u32>().ok())
        .filter(|n| *n > 0);

    match parsed {
        Some(release) => {
            tracing::info!(
                "     Release {:03} obtained from file list of previous run: {}",
                release,
                name
            );
            Some(ReleaseState::after(release - 1))
        }
        None => {
            tracing::warn!("-- Release number cannot be parsed from file list {}.", name);
            None
        }
    }
}

fn from_bundle_labels(names: &[String]) -> Option<ReleaseState> {
    let candidates = names
        .iter()
        .filter(|n| n.starts_with("bundle_") && n.contains("_v"));
    let found = max_release(candidates, &BUNDLE_LABEL);
    if found.is_none() {
        tracing::warn!("-- Bundle label not found. Checking previous kernel list.");
    }
    found.map(ReleaseState::after)
}

fn from_manifests(names: &[String]) -> Option<ReleaseState> {
    let candidates = names.iter().filter(|n| n.contains("_release_"));
    max_release(candidates, &RELEASE_MANIFEST).map(ReleaseState::after)
}

fn max_release<'a>(names: impl Iterator<Item = &'a String>, pattern: &Regex) -> Option<u32> {
    names
        .filter_map(|name| {
            let parsed = pattern
                .captures(name)
                .and_then(|c| c[1].parse::<u32>().ok());
            if parsed.is_none() {
                tracing::warn!("-- Release number cannot be parsed from {}.", name);
            }
            parsed
        })
        .max()
}

fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
