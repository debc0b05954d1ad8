//! Command-line surface for `reel`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub mod commands;
pub mod formatters;
pub mod output;

pub use commands::Commands;

/// Compare semantic (kNN) and lexical (keyword) movie search side by side.
#[derive(Parser, Debug)]
#[command(name = "reel", version, about, propagate_version = true)]
pub struct Cli {
    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging entirely
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
