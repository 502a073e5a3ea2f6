//! Kernel list records
//!
//! ```text
//! FILE             = spice_kernels/lsk/naif0012.tls
//! MAKLABEL_OPTIONS =
//! DESCRIPTION      = NAIF leapseconds kernel.
//! MAPPING          = optional
//! ```

use std::collections::BTreeMap;

use crate::config::KernelPattern;
use crate::kernels::{self, KernelType};

/// One kernel of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelRecord {
    /// Archive-relative path of the kernel
    pub file: String,
    pub options: String,
    pub description: String,
    pub mapping: Option<String>,
}

impl KernelRecord {
    pub fn new(kernel_type: KernelType, name: &str, entry: &KernelPattern) -> Self {
        Self {
            file: kernels::staging_path(kernel_type, name),
            options: entry.options.as_deref().unwrap_or_default().trim().to_string(),
            description: normalize_whitespace(&entry.description),
            mapping: entry
                .mapping
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        }
    }

    pub fn render(&self) -> String {
        let mut text = format!("FILE             = {}\n", self.file);
        if self.options.is_empty() {
            // No trailing blank after the equals sign
            text.push_str("MAKLABEL_OPTIONS =\n");
        } else {
            text.push_str(&format!("MAKLABEL_OPTIONS = {}\n", self.options));
        }
        text.push_str(&format!("DESCRIPTION      = {}\n", self.description));
        if let Some(mapping) = &self.mapping {
            text.push_str(&format!("MAPPING          = {}\n", mapping));
        }
        text
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Entries counted in a kernel list text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSummary {
    /// Kernel names of the non-empty `FILE` records
    pub kernels: Vec<String>,
    /// Every `MAKLABEL_OPTIONS` token but `None`
    pub options: Vec<String>,
    pub option_count: usize,
    pub description_count: usize,
    /// Description of each kernel, keyed by kernel name
    pub descriptions: BTreeMap<String, String>,
}

impl ListSummary {
    pub fn parse(text: &str) -> Self {
        let mut summary = Self::default();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "FILE" if !value.is_empty() => {
                    let name = value.rsplit('/').next().unwrap_or(value);
                    summary.kernels.push(name.trim().to_string());
                }
                "MAKLABEL_OPTIONS" => {
                    summary.option_count += 1;
                    summary.options.extend(
                        value
                            .split_whitespace()
                            .filter(|o| *o != "None")
                            .map(str::to_string),
                    );
                }
                "DESCRIPTION" if !value.is_empty() => {
                    summary.description_count += 1;
                    if let Some(kernel) = summary.kernels.last() {
                        summary
                            .descriptions
                            .insert(kernel.clone(), value.to_string());
                    }
                }
                _ => {}
            }
        }
        summary
    }

    pub fn file_count(&self) -> usize {
        self.kernels.len()
    }

    pub fn counts_match(&self) -> bool {
        self.file_count() == self.option_count && self.option_count == self.description_count
    }
}

/// Names appearing more than once, each reported once, in first-seen order
pub fn duplicates(names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut repeated = Vec::new();
    for name in names {
        if !seen.insert(name.as_str()) && !repeated.contains(name) {
            repeated.push(name.clone());
        }
    }
    repeated
}
