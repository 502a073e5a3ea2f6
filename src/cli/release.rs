use clap::Parser;
use std::path::PathBuf;

/// Arguments for the release command
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// Mission setup file (YAML)
    pub config: PathBuf,

    /// Print the release state as JSON
    #[arg(long)]
    pub json: bool,
}
