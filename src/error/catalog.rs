//! Catalog consistency errors

use super::BundlerError;

/// Creates a duplicate LIDVID error
pub fn duplicate_lidvid(lidvid: impl Into<String>) -> BundlerError {
    BundlerError::DuplicateLidvid {
        lidvid: lidvid.into(),
    }
}

/// Creates a version regression error
pub fn version_regression(
    lid: impl Into<String>,
    vid: impl Into<String>,
    published: impl Into<String>,
) -> BundlerError {
    BundlerError::VersionRegression {
        lid: lid.into(),
        vid: vid.into(),
        published: published.into(),
    }
}

/// Creates a duplicate kernel error from the offending names
pub fn duplicate_kernel(names: &[String]) -> BundlerError {
    BundlerError::DuplicateKernel {
        names: names.join(", "),
    }
}

/// Creates an inventory drift error
pub fn inventory_missing_product(
    lid: impl Into<String>,
    inventory: impl Into<String>,
) -> BundlerError {
    BundlerError::InventoryMissingProduct {
        lid: lid.into(),
        inventory: inventory.into(),
    }
}

/// Creates a missing coverage error
pub fn missing_coverage(kernel: impl Into<String>) -> BundlerError {
    BundlerError::MissingCoverage {
        kernel: kernel.into(),
    }
}

/// Creates an unresolved meta-kernel entry error
pub fn meta_kernel_unresolved(
    meta_kernel: impl Into<String>,
    kernel: impl Into<String>,
) -> BundlerError {
    BundlerError::MetaKernelUnresolved {
        meta_kernel: meta_kernel.into(),
        kernel: kernel.into(),
    }
}

/// Creates a history mismatch error
pub fn history_mismatch(release: u32, reason: impl Into<String>) -> BundlerError {
    BundlerError::HistoryMismatch {
        release,
        reason: reason.into(),
    }
}
