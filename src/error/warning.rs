//! Recoverable conditions
//!
//! Warnings never unwind. They are emitted to the run log and the pipeline
//! continues with the documented fallback.

use thiserror::Error;

/// Non-fatal condition raised during a run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BundlerWarning {
    #[error("No {what} available; {fallback}")]
    RecoverableLookup { what: String, fallback: String },

    #[error(
        "Version discrepancy for {product}: declared {declared}, expected {expected} \
         from the previous release; using {declared}"
    )]
    VersionMismatch {
        product: String,
        declared: u32,
        expected: u32,
    },
}

impl BundlerWarning {
    /// Creates a lookup warning for a missing prior artifact
    pub fn lookup(what: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self::RecoverableLookup {
            what: what.into(),
            fallback: fallback.into(),
        }
    }

    /// Log the warning and hand it back to the caller
    pub fn emit(self) -> Self {
        tracing::warn!("-- {}", self);
        self
    }
}
