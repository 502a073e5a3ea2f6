//! Run command

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::{self, Outcome, RunOptions};

/// Generate a release, or part of one
pub fn run(args: &RunArgs, show_progress: bool) -> Result<()> {
    let config = Config::load(&args.config)?;
    let options = RunOptions {
        show_progress,
        ..RunOptions::from(args)
    };

    match pipeline::run(config, &options)? {
        Outcome::Complete | Outcome::Stopped(_) => {}
        Outcome::NoInput => println!("Nothing to release."),
    }
    Ok(())
}
