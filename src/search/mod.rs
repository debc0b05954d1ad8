//! Hybrid movie search.
//!
//! Every search runs two queries against the same index: vector similarity
//! over the plot and title embeddings, and keyword matching over the plot
//! and title text. The two result lists are kept apart for side-by-side
//! comparison.

pub mod normalize;
pub mod orchestrator;
pub mod query;
pub mod request;

pub use normalize::{MovieRecord, PassageRecord, PassageResult, QueryResult};
pub use orchestrator::{HybridResults, SearchOrchestrator};
pub use query::{HybridQueryBuilder, KeywordQueryBody, QuerySchema, SearchBody, VectorQueryBody};
pub use request::{SearchRequest, SortKey};
