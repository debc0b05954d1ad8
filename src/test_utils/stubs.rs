//! In-process embedding and store doubles.
//!
//! `StubStore` understands just enough of the query DSL to behave like a
//! small index: it applies the genre and rating filters, the sort clause and
//! the page size, and reports the filtered count as the total.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::embedding::EmbeddingProvider;
use crate::error::{EmbeddingFailureKind, ReelError, Result};
use crate::search::query::{Query, SearchBody};
use crate::store::{DocumentStore, RawHit, RawHits, RawSearchResponse, TotalHits};

/// Deterministic embedder that counts its calls.
pub struct StubEmbedder {
    dimension: usize,
    produced: usize,
    failure: Option<EmbeddingFailureKind>,
    stall: bool,
    calls: AtomicUsize,
}

impl StubEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self {
            dimension,
            produced: dimension,
            failure: None,
            stall: false,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub const fn failing(dimension: usize, kind: EmbeddingFailureKind) -> Self {
        let mut stub = Self::new(dimension);
        stub.failure = Some(kind);
        stub
    }

    /// Produce vectors of `len` floats while still reporting the configured
    /// dimension.
    #[must_use]
    pub const fn producing(mut self, len: usize) -> Self {
        self.produced = len;
        self
    }

    /// Never resolve.
    #[must_use]
    pub const fn stalling(mut self) -> Self {
        self.stall = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if self.stall {
            std::future::pending::<()>().await;
        }
        if let Some(kind) = self.failure {
            return Err(ReelError::embedding(kind, "stub failure"));
        }
        let seed: usize = text.bytes().map(usize::from).sum();
        #[allow(clippy::cast_precision_loss)]
        let vector = (0..self.produced)
            .map(|i| ((seed + i) % 8) as f32 / 8.0)
            .collect();
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "stub-embedder"
    }
}

/// Which query body a store call carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Path {
    /// Any KNN query, including lookups.
    Vector,
    /// A full-text `multi_match` query.
    Keyword,
}

impl Path {
    fn of(body: &SearchBody) -> Self {
        match &body.query {
            Query::Bool(bool_query) if !bool_query.must.is_empty() => Self::Keyword,
            Query::MultiMatch(_) => Self::Keyword,
            _ => Self::Vector,
        }
    }
}

/// Catalog-backed document store that records every call.
#[derive(Default)]
pub struct StubStore {
    movies: Vec<(String, Value)>,
    failures: Vec<(Path, ReelError)>,
    bodies: Mutex<Vec<SearchBody>>,
    indices: Mutex<Vec<String>>,
}

impl StubStore {
    #[must_use]
    pub fn with_movies(movies: Vec<(String, Value)>) -> Self {
        Self {
            movies,
            ..Self::default()
        }
    }

    /// Fail every call on `path` with a copy of `error`.
    #[must_use]
    pub fn failing_on(mut self, path: Path, error: ReelError) -> Self {
        self.failures.push((path, error));
        self
    }

    pub fn calls(&self) -> usize {
        self.bodies.lock().len()
    }

    pub fn bodies(&self) -> Vec<SearchBody> {
        self.bodies.lock().clone()
    }

    pub fn indices(&self) -> Vec<String> {
        self.indices.lock().clone()
    }

    fn matches(body: &SearchBody, doc: &Value) -> bool {
        let Query::Bool(bool_query) = &body.query else {
            return true;
        };
        bool_query.filter.iter().all(|filter| match filter {
            Query::QueryString(qs) => {
                let wanted = qs.query.trim();
                wanted == "*"
                    || qs.fields.iter().any(|field| {
                        genres(doc.get(field))
                            .iter()
                            .any(|g| g.eq_ignore_ascii_case(wanted))
                    })
            }
            Query::Range(ranges) => ranges.iter().all(|(field, bound)| {
                doc.get(field)
                    .and_then(Value::as_f64)
                    .is_some_and(|value| value >= bound.gte)
            }),
            _ => true,
        })
    }
}

fn genres(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s.split(',').map(|g| g.trim().to_string()).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn copy_error(err: &ReelError) -> ReelError {
    match err {
        ReelError::EmbeddingFailure { kind, message } => ReelError::embedding(*kind, message.clone()),
        ReelError::SchemaMismatch(m) => ReelError::SchemaMismatch(m.clone()),
        ReelError::StoreUnauthorized(m) => ReelError::StoreUnauthorized(m.clone()),
        ReelError::Cancelled => ReelError::Cancelled,
        other => ReelError::StoreUnavailable(other.to_string()),
    }
}

#[async_trait]
impl DocumentStore for StubStore {
    async fn search(&self, index: &str, body: &SearchBody) -> Result<RawSearchResponse> {
        self.bodies.lock().push(body.clone());
        self.indices.lock().push(index.to_string());

        let path = Path::of(body);
        if let Some((_, err)) = self.failures.iter().find(|(p, _)| *p == path) {
            return Err(copy_error(err));
        }

        let mut matched: Vec<&(String, Value)> = self
            .movies
            .iter()
            .filter(|(_, doc)| Self::matches(body, doc))
            .collect();

        let sort_field = body
            .sort
            .first()
            .and_then(|clause| clause.keys().next())
            .map_or("_score", String::as_str);
        if sort_field != "_score" {
            matched.sort_by(|(_, a), (_, b)| {
                let a = a.get(sort_field).and_then(Value::as_f64).unwrap_or_default();
                let b = b.get(sort_field).and_then(Value::as_f64).unwrap_or_default();
                b.partial_cmp(&a).unwrap_or(Ordering::Equal)
            });
        }

        let total = matched.len() as u64;
        let hits = matched
            .into_iter()
            .take(body.size)
            .map(|(id, doc)| RawHit::from_source(id.clone(), doc.clone()))
            .collect();
        Ok(RawSearchResponse {
            took: Some(1),
            hits: RawHits {
                total: Some(TotalHits::Tracked {
                    value: total,
                    relation: Some("eq".to_string()),
                }),
                hits,
            },
        })
    }

    fn name(&self) -> &str {
        "stub-store"
    }
}
