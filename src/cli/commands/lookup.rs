//! reel lookup - Nearest titles by title embedding

use clap::Args;

use crate::app::AppContext;
use crate::cli::formatters::search_results::render_lookup;
use crate::cli::output::{emit_robot, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Text to compare against movie titles
    pub text: String,

    /// Maximum number of titles
    #[arg(long, short)]
    pub limit: Option<usize>,
}

pub fn run(ctx: &AppContext, args: &LookupArgs) -> Result<()> {
    let limit = args.limit.unwrap_or(ctx.config.query.lookup_limit);
    let result = ctx.block_on_interruptible(ctx.orchestrator.lookup(&args.text, Some(limit)))?;

    if ctx.robot_mode {
        emit_robot(&robot_ok(&result))
    } else {
        println!("{}", render_lookup(&args.text, &result));
        Ok(())
    }
}
