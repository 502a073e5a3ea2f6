//! Error type tests
//!
//! Tests for BundlerError, its taxonomy and conversions.

#![allow(clippy::unwrap_used)]

use crate::error::catalog::{
    duplicate_kernel, duplicate_lidvid, history_mismatch, meta_kernel_unresolved,
    version_regression,
};
use crate::error::config::{grammar_invalid, invalid as config_invalid, not_found};
use crate::error::fs::kernel_not_found;
use crate::error::warning::BundlerWarning;
use crate::error::{BundlerError, ErrorKind};
use miette::Diagnostic;

macro_rules! test_error_contains {
    ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            let err = $err;
            let error_string = err.to_string();
            $(
                assert!(error_string.contains($contains),
                    "Error message should contain '{}', got: {}",
                    $contains,
                    error_string
                );
            )+
        }
    };
}

#[test]
fn test_error_display() {
    let err = not_found("maven.yaml");
    assert_eq!(err.to_string(), "Configuration file not found: maven.yaml");
}

#[test]
fn test_error_code() {
    let err = duplicate_lidvid("urn:nasa:pds:maven.spice:spice_kernels:lsk_naif0012.tls::1.0");
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("bundler::catalog::duplicate_lidvid".to_string())
    );
}

#[test]
fn test_error_kinds() {
    assert_eq!(config_invalid("x").kind(), ErrorKind::Configuration);
    assert_eq!(grammar_invalid("date:", "empty").kind(), ErrorKind::Configuration);
    assert_eq!(
        BundlerError::KernelListCountMismatch {
            list: "l".into(),
            files: 2,
            options: 1,
            descriptions: 2,
        }
        .kind(),
        ErrorKind::Configuration
    );
    assert_eq!(
        duplicate_kernel(&["a.bsp".to_string()]).kind(),
        ErrorKind::CatalogConsistency
    );
    assert_eq!(
        version_regression("lid", "1.0", "2.0").kind(),
        ErrorKind::CatalogConsistency
    );
    assert_eq!(
        history_mismatch(2, "missing inventory").kind(),
        ErrorKind::CatalogConsistency
    );
    assert_eq!(kernel_not_found("a.bsp").kind(), ErrorKind::Io);
}

test_error_contains!(
    test_meta_kernel_unresolved_message,
    meta_kernel_unresolved("maven_v02.tm", "naif0012.tls"),
    "maven_v02.tm",
    "naif0012.tls",
    "not in the archive"
);

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: BundlerError = io_err.into();
    assert!(matches!(err, BundlerError::IoError { .. }));
}

#[test]
fn test_yaml_error_conversion() {
    let parse_result: std::result::Result<serde_yaml::Value, _> =
        serde_yaml::from_str("invalid: yaml: content: [unclosed");
    let err: BundlerError = parse_result.unwrap_err().into();
    assert!(matches!(err, BundlerError::ConfigParseFailed { .. }));
}

#[test]
fn test_regex_error_conversion() {
    let err: BundlerError = regex::Regex::new("[unclosed").unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

test_error_contains!(
    test_kernel_list_count_message,
    BundlerError::KernelListCountMismatch {
        list: "maven_release_02.kernel_list".into(),
        files: 3,
        options: 2,
        descriptions: 3,
    },
    "FILE (3)",
    "MAKLABEL_OPTIONS (2)",
    "DESCRIPTION (3)"
);

test_error_contains!(
    test_duplicate_kernel_message,
    duplicate_kernel(&["a.bsp".to_string(), "b.bc".to_string()]),
    "a.bsp, b.bc"
);

test_error_contains!(
    test_kernel_not_found_message,
    kernel_not_found("maven_orb.bsp"),
    "maven_orb.bsp",
    "not present"
);

test_error_contains!(
    test_version_mismatch_warning_message,
    BundlerWarning::VersionMismatch {
        product: "maven_v05.tm".into(),
        declared: 5,
        expected: 4,
    },
    "declared 5",
    "expected 4"
);
