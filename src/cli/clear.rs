use clap::Parser;
use std::path::PathBuf;

/// Arguments for the clear command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Remove the files of release 5:\n    \
                   spice-bundler clear maven.yaml working/maven_release_05.file_list")]
pub struct ClearArgs {
    /// Mission setup file (YAML)
    pub config: PathBuf,

    /// File list written by the run to roll back
    pub file_list: PathBuf,
}
