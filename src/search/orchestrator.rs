//! Query orchestration.
//!
//! One user search embeds the query text once, builds both query bodies,
//! runs them against the store concurrently and normalizes each response.
//! The embedding client and the store are injected so the whole flow can
//! run against in-process stubs.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::{ReelError, Result};
use crate::search::normalize::{
    PassageResult, QueryResult, normalize_limited, normalize_passages,
};
use crate::search::query::{HybridQueryBuilder, SearchBody, vector_lookup};
use crate::search::request::{DEFAULT_LOOKUP_LIMIT, SearchRequest, clamp_limit};
use crate::store::DocumentStore;

/// Vector field and projection used for passage retrieval.
const PASSAGE_VECTOR_FIELD: &str = "v_content";
const PASSAGE_FIELDS: &[&str] = &["content", "title"];

/// Outcome of one hybrid search.
///
/// A path whose store call was unavailable carries its error; the other path
/// is still reported. Every other failure fails the whole search instead.
#[derive(Debug)]
pub struct HybridResults {
    pub vector: std::result::Result<QueryResult, ReelError>,
    pub keyword: std::result::Result<QueryResult, ReelError>,
}

impl HybridResults {
    /// Both results, or the first path error.
    pub fn into_pair(self) -> Result<(QueryResult, QueryResult)> {
        Ok((self.vector?, self.keyword?))
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.vector.is_ok() && self.keyword.is_ok()
    }
}

/// Serializable view of [`HybridResults`] for robot output.
#[derive(Debug, Serialize)]
pub struct PathReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a QueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PathError>,
}

#[derive(Debug, Serialize)]
pub struct PathError {
    pub code: &'static str,
    pub message: String,
}

impl<'a> PathReport<'a> {
    #[must_use]
    pub fn from_outcome(outcome: &'a std::result::Result<QueryResult, ReelError>) -> Self {
        match outcome {
            Ok(result) => Self {
                result: Some(result),
                error: None,
            },
            Err(err) => Self {
                result: None,
                error: Some(PathError {
                    code: err.code(),
                    message: err.to_string(),
                }),
            },
        }
    }
}

pub struct SearchOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
    builder: HybridQueryBuilder,
    index: String,
    passage_index: String,
}

impl SearchOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn DocumentStore>,
        index: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            store,
            builder: HybridQueryBuilder::default(),
            index: index.into(),
            passage_index: crate::config::DEFAULT_PASSAGE_INDEX.to_string(),
        }
    }

    #[must_use]
    pub fn with_passage_index(mut self, passage_index: impl Into<String>) -> Self {
        self.passage_index = passage_index.into();
        self
    }

    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Run one hybrid search.
    ///
    /// Fails without contacting the store when embedding fails or yields a
    /// vector of the wrong dimension. Store failures other than
    /// unavailability, or both paths failing, fail the search.
    pub async fn search(&self, request: &SearchRequest) -> Result<HybridResults> {
        let started = Instant::now();
        let embedding = self.embed(&request.query_text).await?;
        let (vector_body, keyword_body) = self.builder.build(request, &embedding);

        let (vector_raw, keyword_raw) = tokio::join!(
            self.store.search(&self.index, vector_body.body()),
            self.store.search(&self.index, keyword_body.body()),
        );

        let limit = request.effective_limit();
        let vector = vector_raw.map(|raw| normalize_limited(&raw.hits, limit));
        let keyword = keyword_raw.map(|raw| normalize_limited(&raw.hits, limit));
        let results = settle(vector, keyword)?;

        info!(
            index = %self.index,
            sort = %request.sort_key,
            genre = request.effective_genre(),
            min_rating = request.effective_min_rating(),
            vector_total = results.vector.as_ref().map_or(0, |r| r.total_matched),
            keyword_total = results.keyword.as_ref().map_or(0, |r| r.total_matched),
            elapsed_ms = started.elapsed().as_millis(),
            "hybrid search complete"
        );
        Ok(results)
    }

    /// [`Self::search`] that gives up with `Cancelled` once `cancel`
    /// resolves. In-flight requests are dropped.
    pub async fn search_until<C>(&self, request: &SearchRequest, cancel: C) -> Result<HybridResults>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            result = self.search(request) => result,
            () = cancel => {
                warn!(index = %self.index, "search cancelled");
                Err(ReelError::Cancelled)
            }
        }
    }

    /// Nearest titles to `text` by title vector.
    pub async fn lookup(&self, text: &str, limit: Option<usize>) -> Result<QueryResult> {
        let limit = clamp_limit(limit.unwrap_or(DEFAULT_LOOKUP_LIMIT));
        let embedding = self.embed(text).await?;
        let body = self.builder.title_lookup(&embedding, limit);
        self.single(&self.index, &body, limit).await
    }

    /// Passages nearest to `text` from the passage index.
    pub async fn passages(&self, text: &str, limit: usize) -> Result<PassageResult> {
        let limit = clamp_limit(limit);
        let embedding = self.embed(text).await?;
        let body = vector_lookup(PASSAGE_VECTOR_FIELD, &embedding, limit, PASSAGE_FIELDS);
        let raw = self.store.search(&self.passage_index, &body).await?;
        Ok(normalize_passages(&raw.hits, limit))
    }

    async fn single(&self, index: &str, body: &SearchBody, limit: usize) -> Result<QueryResult> {
        let raw = self.store.search(index, body).await?;
        Ok(normalize_limited(&raw.hits, limit))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.embedder.embed(text).await?;
        let expected = self.embedder.dimension();
        if embedding.len() != expected {
            return Err(ReelError::SchemaMismatch(format!(
                "embedding from {} has {} dimensions, index expects {expected}",
                self.embedder.name(),
                embedding.len()
            )));
        }
        debug!(model = self.embedder.name(), dimension = expected, "query embedded");
        Ok(embedding)
    }
}

/// Apply the partial-failure policy to the two path outcomes.
fn settle(vector: Result<QueryResult>, keyword: Result<QueryResult>) -> Result<HybridResults> {
    match (vector, keyword) {
        (Err(vector_err), Err(keyword_err)) => {
            if vector_err.is_path_local() && !keyword_err.is_path_local() {
                Err(keyword_err)
            } else {
                Err(vector_err)
            }
        }
        (Err(err), Ok(_)) | (Ok(_), Err(err)) if !err.is_path_local() => Err(err),
        (vector, keyword) => {
            if let Err(err) = &vector {
                warn!(path = "vector", error = %err, "query path failed");
            }
            if let Err(err) = &keyword {
                warn!(path = "keyword", error = %err, "query path failed");
            }
            Ok(HybridResults { vector, keyword })
        }
    }
}
