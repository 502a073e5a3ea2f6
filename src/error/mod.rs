//! Error types and handling for the bundler
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Errors fall into three fatal families, reported through [`ErrorKind`]:
//! - configuration: malformed setup, grammar, plan or kernel list
//! - catalog consistency: LIDVID clashes, inventory drift, unknown kernels
//! - I/O: files missing from the kernel pools or unreadable/unwritable
//!
//! Non-fatal conditions live in [`warning`] and are only logged.
//!
//! This module is organized into sub-modules of constructor helpers:
//! - [`config`]: Configuration errors
//! - [`catalog`]: Catalog consistency errors
//! - [`fs`]: File system errors

pub mod catalog;
pub mod config;
pub mod fs;
pub mod warning;

#[cfg(test)]
mod tests;

use miette::Diagnostic;
use thiserror::Error;

/// Fatal error family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    CatalogConsistency,
    Io,
}

/// Main error type for bundler operations
#[derive(Error, Diagnostic, Debug)]
pub enum BundlerError {
    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(bundler::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(bundler::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(bundler::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Invalid meta-kernel grammar token '{token}': {reason}")]
    #[diagnostic(
        code(bundler::config::grammar_invalid),
        help("Tokens are file name globs, optionally prefixed with 'date:' or 'exclude:'")
    )]
    GrammarInvalid { token: String, reason: String },

    #[error(
        "Kernel list {list} does not have the same number of entries: \
         FILE ({files}), MAKLABEL_OPTIONS ({options}), DESCRIPTION ({descriptions})"
    )]
    #[diagnostic(
        code(bundler::config::kernel_list_count),
        help("Every FILE record needs one MAKLABEL_OPTIONS and one DESCRIPTION line")
    )]
    KernelListCountMismatch {
        list: String,
        files: usize,
        options: usize,
        descriptions: usize,
    },

    #[error("Invalid release plan: {message}")]
    #[diagnostic(code(bundler::config::plan_invalid))]
    PlanInvalid { message: String },

    // Catalog consistency errors
    #[error("Duplicate LIDVID in catalog: {lidvid}")]
    #[diagnostic(
        code(bundler::catalog::duplicate_lidvid),
        help("A product with this identifier was already registered or published")
    )]
    DuplicateLidvid { lidvid: String },

    #[error("Version regression for {lid}: {vid} is not above published {published}")]
    #[diagnostic(code(bundler::catalog::version_regression))]
    VersionRegression {
        lid: String,
        vid: String,
        published: String,
    },

    #[error("Kernel list contains duplicates: {names}")]
    #[diagnostic(code(bundler::catalog::duplicate_kernel))]
    DuplicateKernel { names: String },

    #[error("Product {lid} not found in inventory {inventory}")]
    #[diagnostic(
        code(bundler::catalog::inventory_missing_product),
        help("Consider regenerating the increment: the inventory was written before every product was registered")
    )]
    InventoryMissingProduct { lid: String, inventory: String },

    #[error("No coverage interval available for meta-kernel entry {kernel}")]
    #[diagnostic(
        code(bundler::catalog::missing_coverage),
        help("A kernel referenced by the meta-kernel must be staged now or present in the prior archive")
    )]
    MissingCoverage { kernel: String },

    #[error("Meta-kernel {meta_kernel} lists {kernel}, which is not in the archive")]
    #[diagnostic(code(bundler::catalog::meta_kernel_unresolved))]
    MetaKernelUnresolved { meta_kernel: String, kernel: String },

    #[error("Archive history of release {release} is inconsistent: {reason}")]
    #[diagnostic(
        code(bundler::catalog::history_mismatch),
        help("Check the bundle labels, inventories and checksum tables of the archive")
    )]
    HistoryMismatch { release: u32, reason: String },

    // File system errors
    #[error("Kernel {name} not present in any kernel directory")]
    #[diagnostic(code(bundler::fs::kernel_not_found))]
    KernelNotFound { name: String },

    #[error("File not found: {path}")]
    #[diagnostic(code(bundler::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(bundler::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(bundler::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(bundler::fs::io_error))]
    IoError { message: String },
}

impl BundlerError {
    /// Fatal family this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigNotFound { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigInvalid { .. }
            | Self::GrammarInvalid { .. }
            | Self::KernelListCountMismatch { .. }
            | Self::PlanInvalid { .. } => ErrorKind::Configuration,
            Self::DuplicateLidvid { .. }
            | Self::VersionRegression { .. }
            | Self::DuplicateKernel { .. }
            | Self::InventoryMissingProduct { .. }
            | Self::MissingCoverage { .. }
            | Self::MetaKernelUnresolved { .. }
            | Self::HistoryMismatch { .. } => ErrorKind::CatalogConsistency,
            Self::KernelNotFound { .. }
            | Self::FileNotFound { .. }
            | Self::FileReadFailed { .. }
            | Self::FileWriteFailed { .. }
            | Self::IoError { .. } => ErrorKind::Io,
        }
    }
}

impl From<std::io::Error> for BundlerError {
    fn from(err: std::io::Error) -> Self {
        BundlerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for BundlerError {
    fn from(err: serde_yaml::Error) -> Self {
        BundlerError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BundlerError {
    fn from(err: serde_json::Error) -> Self {
        BundlerError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<regex::Error> for BundlerError {
    fn from(err: regex::Error) -> Self {
        BundlerError::ConfigInvalid {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, BundlerError>;
