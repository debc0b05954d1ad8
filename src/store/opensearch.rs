//! Search-engine HTTP client.
//!
//! Sends query bodies to `POST {base}/{index}/_search` and classifies
//! failures into the store error kinds the orchestrator distinguishes.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{ReelError, Result};
use crate::search::query::SearchBody;
use crate::store::{DocumentStore, RawSearchResponse};

/// Error fragments the engine uses when a query does not fit the mapping.
const SCHEMA_MARKERS: &[&str] = &[
    "dimension",
    "index_not_found",
    "no such index",
    "failed to create query",
    "not knn_vector type",
    "no mapping found",
    "mapper_parsing",
];

pub struct OpenSearchClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl OpenSearchClient {
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|err| ReelError::Config(format!("search http client: {err}")))?;
        Ok(Self {
            http,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    fn search_url(&self, index: &str) -> String {
        format!("{}/{}/_search", self.base_url, index)
    }
}

#[async_trait]
impl DocumentStore for OpenSearchClient {
    async fn search(&self, index: &str, body: &SearchBody) -> Result<RawSearchResponse> {
        let started = Instant::now();
        let mut request = self.http.post(self.search_url(index)).json(body);
        if let Some(token) = self.auth_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| {
            let what = if err.is_timeout() { "timed out" } else { "request failed" };
            ReelError::StoreUnavailable(format!("{index}: {what}: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, index, &text));
        }

        let raw: RawSearchResponse = response.json().await.map_err(|err| {
            ReelError::StoreUnavailable(format!("{index}: undecodable response: {err}"))
        })?;
        debug!(
            index,
            hits = raw.hits.hits.len(),
            total = raw.hits.total_matched(),
            took_ms = raw.took,
            elapsed_ms = started.elapsed().as_millis(),
            "store search complete"
        );
        Ok(raw)
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}

fn classify_status(status: StatusCode, index: &str, body: &str) -> ReelError {
    let message = format!("{index}: status {status}: {body}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ReelError::StoreUnauthorized(message),
        StatusCode::NOT_FOUND => ReelError::SchemaMismatch(message),
        StatusCode::BAD_REQUEST if mentions_schema(body) => ReelError::SchemaMismatch(message),
        _ => ReelError::StoreUnavailable(message),
    }
}

fn mentions_schema(body: &str) -> bool {
    let lower = body.to_lowercase();
    SCHEMA_MARKERS.iter().any(|marker| lower.contains(marker))
}
