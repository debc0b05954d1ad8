//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod completions;
pub mod config;
pub mod lookup;
pub mod passages;
pub mod search;

use crate::app::AppContext;
use crate::cli::Cli;
use crate::error::Result;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one query as kNN and keyword search and compare the results
    Search(search::SearchArgs),

    /// Find movies whose titles are closest in meaning to the text
    Lookup(lookup::LookupArgs),

    /// Retrieve document passages closest to the text
    Passages(passages::PassagesArgs),

    /// Show the effective configuration
    Config(config::ConfigArgs),

    /// Print a shell completion script
    Completions(completions::CompletionsArgs),
}

/// Dispatch the parsed command. Only commands that talk to the backends
/// open an [`AppContext`].
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Search(args) => with_context(cli, |ctx| search::run(ctx, args)),
        Commands::Lookup(args) => with_context(cli, |ctx| lookup::run(ctx, args)),
        Commands::Passages(args) => with_context(cli, |ctx| passages::run(ctx, args)),
        Commands::Config(args) => {
            let loaded = crate::config::Config::load(cli.config.as_deref())?;
            config::run(&loaded, cli.robot, args)
        }
        Commands::Completions(args) => completions::run(args),
    }
}

fn with_context(cli: &Cli, command: impl FnOnce(&AppContext) -> Result<()>) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    let result = command(&ctx);
    ctx.shutdown();
    result
}
