//! Command implementations for the bundler CLI

pub mod clear;
pub mod completions;
pub mod release;
pub mod run;
pub mod version;
