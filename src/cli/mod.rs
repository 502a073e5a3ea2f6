//! CLI definitions using clap derive API
//!
//! One submodule per command's argument types:
//! - run: Run command arguments
//! - clear: Clear command arguments
//! - release: Release command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod clear;
pub mod completions;
pub mod release;
pub mod run;

pub use clear::ClearArgs;
pub use completions::CompletionsArgs;
pub use release::ReleaseArgs;
pub use run::RunArgs;

/// SPICE kernel archive generator
///
/// Builds PDS4 SPICE archive releases incrementally from a mission setup file.
#[derive(Parser, Debug)]
#[command(
    name = "spice-bundler",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Incremental SPICE kernel archive bundle generator",
    long_about = "Generates a new release of a PDS4 SPICE archive: stages the kernels of the \
                  release, writes meta-kernels, collection inventories, checksum tables and the \
                  bundle label, then copies everything into the archive.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  spice-bundler run maven.yaml                     \x1b[90m# Generate the next release\x1b[0m\n   \
                  spice-bundler run maven.yaml -f list             \x1b[90m# Stop after the kernel list\x1b[0m\n   \
                  spice-bundler run maven.yaml -p maven.plan -d log \x1b[90m# Release from a plan, log diffs\x1b[0m\n   \
                  spice-bundler clear maven.yaml maven_release_04.file_list\n   \
                  spice-bundler release maven.yaml --json          \x1b[90m# Show the release numbers\x1b[0m\n"
)]
pub struct Cli {
    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short = 's', global = true)]
    pub silent: bool,

    /// Also write the full log to this file
    #[arg(long, global = true, value_name = "PATH", env = "SPICE_BUNDLER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a release of the archive
    Run(RunArgs),

    /// Remove the files written by an earlier run
    Clear(ClearArgs),

    /// Show the release the next run would generate
    Release(ReleaseArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DiffMode, Faucet};

    #[test]
    fn test_cli_parsing_run() {
        let cli = Cli::try_parse_from(["spice-bundler", "run", "maven.yaml"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("maven.yaml"));
                assert!(args.plan.is_none());
                assert!(args.faucet.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parsing_run_options() {
        let cli = Cli::try_parse_from([
            "spice-bundler",
            "run",
            "maven.yaml",
            "-p",
            "maven_release_02.plan",
            "-f",
            "staging",
            "-d",
            "all",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.plan, Some(PathBuf::from("maven_release_02.plan")));
                assert_eq!(args.faucet, Some(Faucet::Staging));
                assert_eq!(args.diff, Some(DiffMode::All));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_faucet() {
        let result = Cli::try_parse_from(["spice-bundler", "run", "maven.yaml", "-f", "upload"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_clear() {
        let cli = Cli::try_parse_from([
            "spice-bundler",
            "clear",
            "maven.yaml",
            "maven_release_02.file_list",
        ])
        .unwrap();
        match cli.command {
            Commands::Clear(args) => {
                assert_eq!(args.file_list, PathBuf::from("maven_release_02.file_list"));
            }
            _ => panic!("Expected Clear command"),
        }
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["spice-bundler", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "spice-bundler",
            "release",
            "maven.yaml",
            "-s",
            "--log-file",
            "run.log",
        ])
        .unwrap();
        assert!(cli.silent);
        assert!(!cli.verbose);
        assert_eq!(cli.log_file, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::try_parse_from(["spice-bundler", "completions", "bash"]).unwrap();
        match cli.command {
            Commands::Completions(args) => {
                assert_eq!(args.shell, "bash");
            }
            _ => panic!("Expected Completions command"),
        }
    }
}
