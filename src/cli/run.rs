use clap::Parser;
use std::path::PathBuf;

use crate::context::{DiffMode, Faucet};

/// Arguments for the run command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Generate the next release:\n    spice-bundler run maven.yaml\n\n\
                   Release the kernels of a plan:\n    spice-bundler run maven.yaml -p maven_release_05.plan\n\n\
                   Label a single kernel:\n    spice-bundler run maven.yaml -p maven_orb_20240101.bsp -f labels\n\n\
                   Redo a release from scratch:\n    spice-bundler run maven.yaml -c maven_release_05.file_list -f bundle")]
pub struct RunArgs {
    /// Mission setup file (YAML)
    pub config: PathBuf,

    /// Release plan (*.plan), or a single kernel when labeling
    #[arg(long, short = 'p', value_name = "PLAN")]
    pub plan: Option<PathBuf>,

    /// Stop the run at this step
    #[arg(long, short = 'f', value_enum)]
    pub faucet: Option<Faucet>,

    /// Compare generated products with their earlier versions
    #[arg(long, short = 'd', value_enum)]
    pub diff: Option<DiffMode>,

    /// File list of a previous run to remove first
    #[arg(long, short = 'c', value_name = "FILE_LIST")]
    pub clear: Option<PathBuf>,

    /// Use this kernel list instead of writing one
    #[arg(long, short = 'k', value_name = "KERNEL_LIST")]
    pub kernel_list: Option<PathBuf>,
}
