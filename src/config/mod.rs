//! Configuration file handling
//!
//! This module contains data structures for:
//! - the mission setup file (YAML) driving every run
//! - the directory layout derived from it

pub mod layout;
pub mod setup;

pub use layout::Layout;
pub use setup::{Config, KernelPattern, LineEnding, MetaKernelConfig};
