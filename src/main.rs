//! spice-bundler - SPICE kernel archive generator
//!
//! Generates incremental releases of a PDS4 SPICE kernel archive: staged
//! kernels, meta-kernels, collection inventories, checksum tables and the
//! bundle label of each release.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

mod catalog;
mod checksum;
mod cli;
mod commands;
mod common;
mod config;
mod context;
mod coverage;
mod diff;
mod document;
mod error;
mod file_list;
mod history;
mod inventory;
mod kernel_list;
mod kernels;
mod label;
mod metakernel;
mod pipeline;
mod progress;
mod release;
mod staging;
mod template;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};
use error::{Result, fs as fs_err};

/// Terminal log level from the verbosity flags
fn terminal_level(verbose: bool, silent: bool) -> &'static str {
    if verbose {
        "debug"
    } else if silent {
        "warn"
    } else {
        "info"
    }
}

/// Install the terminal logger and the optional log file
///
/// `RUST_LOG` overrides the verbosity flags on the terminal. The log file
/// always receives everything down to debug.
fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(terminal_level(cli.verbose, cli.silent)));
    let terminal = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    let file = match cli.log_file.as_deref() {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(create_log_file(path)?))
                .with_filter(LevelFilter::DEBUG),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(terminal)
        .with(file)
        .init();
    Ok(())
}

fn create_log_file(path: &Path) -> Result<File> {
    common::fs::ensure_parent_dir(path)?;
    File::create(path).map_err(|e| fs_err::write_failed(path, &e))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let show_progress = !cli.silent;
    let result = match &cli.command {
        Commands::Run(args) => commands::run::run(args, show_progress),
        Commands::Clear(args) => commands::clear::run(args),
        Commands::Release(args) => commands::release::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        tracing::debug!(kind = ?e.kind(), "{:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_level() {
        assert_eq!(terminal_level(false, false), "info");
        assert_eq!(terminal_level(false, true), "warn");
        assert_eq!(terminal_level(true, false), "debug");
        // verbose wins over silent
        assert_eq!(terminal_level(true, true), "debug");
    }

    #[test]
    fn test_create_log_file_makes_parents() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("logs/run.log");
        create_log_file(&path).unwrap();
        assert!(path.is_file());
    }
}
