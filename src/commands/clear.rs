//! Clear command

use crate::cli::ClearArgs;
use crate::config::Config;
use crate::context::Faucet;
use crate::error::Result;
use crate::pipeline::{self, RunOptions};

/// Roll back the files listed by an earlier run
pub fn run(args: &ClearArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let options = RunOptions {
        faucet: Some(Faucet::Clear),
        clear: Some(args.file_list.clone()),
        ..RunOptions::default()
    };
    pipeline::run(config, &options)?;
    Ok(())
}
