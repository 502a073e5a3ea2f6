//! Release command

use crate::cli::ReleaseArgs;
use crate::config::{Config, Layout};
use crate::error::Result;
use crate::release;

/// Print the release the next run would generate
pub fn run(args: &ReleaseArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let state = release::resolve_from_disk(&Layout::new(&config), None)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{} {}", config.mission.name, state);
    }
    Ok(())
}
