//! reel passages - Document passages closest to a question

use clap::Args;

use crate::app::AppContext;
use crate::cli::formatters::search_results::render_passages;
use crate::cli::output::{emit_robot, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct PassagesArgs {
    /// Question or topic text
    pub text: String,

    /// Maximum number of passages
    #[arg(long, short)]
    pub limit: Option<usize>,
}

pub fn run(ctx: &AppContext, args: &PassagesArgs) -> Result<()> {
    let limit = args.limit.unwrap_or(ctx.config.query.result_limit);
    let result = ctx.block_on_interruptible(ctx.orchestrator.passages(&args.text, limit))?;

    if ctx.robot_mode {
        emit_robot(&robot_ok(&result))
    } else {
        println!("{}", render_passages(&result));
        Ok(())
    }
}
