//! reelsearch: side-by-side semantic and lexical movie search.
//!
//! A query is embedded once and issued twice against the same search index,
//! as a KNN query over the plot and title vectors and as a keyword query
//! over the plot and title text, so the two ranking strategies can be
//! compared under identical filters and sort order.

pub mod app;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod search;
pub mod store;
pub mod test_utils;

pub use error::{ReelError, Result};
