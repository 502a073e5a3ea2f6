//! File system errors

use std::path::Path;

use super::BundlerError;

/// Creates a file not found error
pub fn not_found(path: impl Into<String>) -> BundlerError {
    BundlerError::FileNotFound { path: path.into() }
}

/// Creates a read failure for `path`
pub fn read_failed(path: &Path, err: &std::io::Error) -> BundlerError {
    BundlerError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a write failure for `path`
pub fn write_failed(path: &Path, err: &std::io::Error) -> BundlerError {
    BundlerError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a kernel missing from every pool error
pub fn kernel_not_found(name: impl Into<String>) -> BundlerError {
    BundlerError::KernelNotFound { name: name.into() }
}
