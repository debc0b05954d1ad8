//! Search results formatter
//!
//! Renders the two query paths as side-by-side columns, and the single-list
//! lookup and passage results as plain numbered lists.

use console::{Alignment, Term, pad_str, style};
use itertools::{EitherOrBoth, Itertools};
use tracing::debug;

use crate::cli::output::HumanLayout;
use crate::error::ReelError;
use crate::search::{HybridResults, MovieRecord, PassageResult, QueryResult};

const VECTOR_HEADING: &str = "Semantic search using kNN";
const KEYWORD_HEADING: &str = "Lexical search using keywords";
const GUTTER: &str = "  |  ";
const DEFAULT_WIDTH: usize = 120;
const MIN_COLUMN: usize = 24;

/// Side-by-side view of one hybrid search.
pub struct ComparisonView<'a> {
    results: &'a HybridResults,
    width: usize,
}

impl<'a> ComparisonView<'a> {
    #[must_use]
    pub fn new(results: &'a HybridResults) -> Self {
        Self {
            results,
            width: terminal_width(),
        }
    }

    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn render(&self) -> String {
        let column = (self.width.saturating_sub(GUTTER.len()) / 2).max(MIN_COLUMN);
        let left = column_lines(VECTOR_HEADING, &self.results.vector, column);
        let right = column_lines(KEYWORD_HEADING, &self.results.keyword, column);
        debug!(width = self.width, column, "rendering comparison");

        left.iter()
            .zip_longest(right.iter())
            .map(|pair| {
                let (l, r) = match pair {
                    EitherOrBoth::Both(l, r) => (l.as_str(), r.as_str()),
                    EitherOrBoth::Left(l) => (l.as_str(), ""),
                    EitherOrBoth::Right(r) => ("", r.as_str()),
                };
                let padded = pad_str(l, column, Alignment::Left, None);
                format!("{padded}{GUTTER}{r}").trim_end().to_string()
            })
            .join("\n")
    }
}

/// "Showing N out of M matched documents"
#[must_use]
pub fn showing_line(result: &QueryResult) -> String {
    format!(
        "Showing {} out of {} matched documents",
        result.records.len(),
        result.total_matched
    )
}

fn column_lines(
    heading: &str,
    outcome: &Result<QueryResult, ReelError>,
    width: usize,
) -> Vec<String> {
    let mut lines = vec![
        style(heading).bold().to_string(),
        "=".repeat(heading.len().min(width)),
    ];
    match outcome {
        Ok(result) => {
            lines.push(style(showing_line(result)).dim().to_string());
            lines.push(String::new());
            for record in &result.records {
                lines.extend(record_lines(record, width));
                lines.push(String::new());
            }
        }
        Err(err) => {
            lines.push(style("unavailable").red().to_string());
            lines.extend(wrap(&err.to_string(), width));
        }
    }
    lines
}

fn record_lines(record: &MovieRecord, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let heading = if record.year > 0 {
        format!("{} ({})", record.title, record.year)
    } else {
        record.title.clone()
    };
    lines.extend(
        wrap(&heading, width)
            .into_iter()
            .map(|line| style(line).bold().to_string()),
    );
    lines.extend(wrap(&record.plot, width));
    lines.extend(wrap(
        &format!("{:.1} ★ {}", record.rating, record.genres),
        width,
    ));
    if !record.poster_url.is_empty() {
        lines.push(style(truncate(&record.poster_url, width)).dim().to_string());
    }
    lines
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    textwrap::wrap(text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    console::truncate_str(text, width, "…").into_owned()
}

fn terminal_width() -> usize {
    let term = Term::stdout();
    if term.is_term() {
        usize::from(term.size().1)
    } else {
        DEFAULT_WIDTH
    }
}

#[must_use]
pub fn render_lookup(text: &str, result: &QueryResult) -> String {
    let mut layout = HumanLayout::new();
    layout
        .title(&format!("Titles closest to \"{text}\""))
        .push_line(showing_line(result))
        .blank();
    for (i, record) in result.records.iter().enumerate() {
        layout.push_line(format!("{:>2}. {}", i + 1, style(&record.title).bold()));
        if !record.plot.is_empty() {
            layout.push_line(format!("    {}", record.plot));
        }
    }
    layout.build()
}

#[must_use]
pub fn render_passages(result: &PassageResult) -> String {
    let mut layout = HumanLayout::new();
    layout.push_line(format!(
        "Showing {} out of {} matched passages",
        result.passages.len(),
        result.total_matched
    ));
    for passage in &result.passages {
        layout
            .blank()
            .section(if passage.title.is_empty() { "(untitled)" } else { passage.title.as_str() })
            .push_line(passage.content.clone());
    }
    layout.build()
}
