//! Pattern matching helpers
//!
//! File name globs go through wax; structured names go through regex.

use regex::Regex;
use wax::{CandidatePath, Glob, Pattern};

/// Compile a regex known at build time
///
/// Only for literal patterns in this crate, which are covered by tests.
#[allow(clippy::expect_used)]
pub fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex must compile")
}

/// Check if a glob pattern matches a file name
///
/// Falls back to an exact comparison when the pattern is not a valid glob.
pub fn matches_glob(pattern: &str, name: &str) -> bool {
    let candidate = CandidatePath::from(name);
    match Glob::new(pattern) {
        Ok(glob) => glob.matched(&candidate).is_some(),
        Err(_) => pattern == name,
    }
}

/// Validate a glob pattern, returning the parser's message on failure
pub fn check_glob(pattern: &str) -> Result<(), String> {
    Glob::new(pattern).map(|_| ()).map_err(|e| e.to_string())
}
