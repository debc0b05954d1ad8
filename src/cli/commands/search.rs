//! reel search - Compare kNN and keyword results for one query

use std::io::{BufRead, Write};

use clap::Args;
use serde::Serialize;

use crate::app::{AppContext, interrupted};
use crate::cli::formatters::search_results::ComparisonView;
use crate::cli::output::{emit_robot, robot_ok, robot_partial};
use crate::error::{ReelError, Result};
use crate::search::orchestrator::PathReport;
use crate::search::{HybridResults, SearchRequest, SortKey};

const PROMPT: &str = "What are you looking for? ";

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search text (prompted for when omitted)
    pub query: Option<String>,

    /// Sort order: relevance, year or rating
    #[arg(long, default_value = "relevance")]
    pub sort: String,

    /// Genre filter expression, e.g. "Comedy" or "Drama OR Thriller"
    #[arg(long, short, default_value = "*")]
    pub genre: String,

    /// Only include movies rated at least this high
    #[arg(long, allow_negative_numbers = true)]
    pub min_rating: Option<f64>,

    /// Results per column
    #[arg(long, short)]
    pub limit: Option<usize>,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    request: &'a SearchRequest,
    vector: PathReport<'a>,
    keyword: PathReport<'a>,
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let query_text = match &args.query {
        Some(text) => text.clone(),
        None => prompt_for_query()?,
    };
    let request = build_request(args, query_text, ctx.config.query.result_limit)?;

    let results = ctx.block_on(ctx.orchestrator.search_until(&request, interrupted()))?;

    if ctx.robot_mode {
        emit_results_robot(&request, &results)
    } else {
        println!("{}", ComparisonView::new(&results).render());
        Ok(())
    }
}

/// Validate arguments into a request. Empty query text is rejected here.
pub fn build_request(
    args: &SearchArgs,
    query_text: String,
    default_limit: usize,
) -> Result<SearchRequest> {
    let query_text = query_text.trim().to_string();
    if query_text.is_empty() {
        return Err(ReelError::ValidationFailed(
            "query text is empty".to_string(),
        ));
    }

    let mut request = SearchRequest::new(query_text)
        .with_sort(SortKey::parse_lenient(&args.sort))
        .with_genre(args.genre.clone())
        .with_limit(args.limit.unwrap_or(default_limit));
    if let Some(min_rating) = args.min_rating {
        request = request.with_min_rating(min_rating);
    }
    Ok(request)
}

fn prompt_for_query() -> Result<String> {
    let mut stderr = std::io::stderr();
    stderr.write_all(PROMPT.as_bytes())?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn emit_results_robot(request: &SearchRequest, results: &HybridResults) -> Result<()> {
    let data = SearchOutput {
        request,
        vector: PathReport::from_outcome(&results.vector),
        keyword: PathReport::from_outcome(&results.keyword),
    };
    if results.is_complete() {
        return emit_robot(&robot_ok(data));
    }

    let warnings: Vec<String> = [&results.vector, &results.keyword]
        .into_iter()
        .filter_map(|outcome| outcome.as_ref().err().map(ToString::to_string))
        .collect();
    let failed = warnings.len();
    emit_robot(&robot_partial(data, 2 - failed, failed, warnings))
}
