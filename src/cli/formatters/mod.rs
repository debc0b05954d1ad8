//! Result formatters for human output.

pub mod search_results;
