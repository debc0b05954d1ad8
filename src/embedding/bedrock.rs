//! Managed embedding model client.
//!
//! Invokes a text embedding model through the runtime `invoke` endpoint:
//! `POST {base}/model/{model_id}/invoke` with `{"inputText": ...}`, answered
//! by `{"embedding": [...], "inputTextTokenCount": n}`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{EmbeddingFailureKind, ReelError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeRequest<'a> {
    input_text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvokeResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    input_text_token_count: Option<u64>,
}

pub struct BedrockEmbedder {
    http: reqwest::Client,
    base_url: String,
    model_id: String,
    dimension: usize,
    api_key: Option<String>,
}

impl BedrockEmbedder {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        if config.model_id.trim().is_empty() {
            return Err(ReelError::MissingConfig(
                "embedding model_id is empty; set [embedding].model_id".to_string(),
            ));
        }
        let base_url = config.base_url()?;
        if config.api_key.is_none() {
            if let Some(role) = config.assume_role.as_deref() {
                warn!(
                    role,
                    "no embedding API key set; credentials for the assumed role must be supplied by the environment"
                );
            }
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|err| ReelError::Config(format!("embedding http client: {err}")))?;
        Ok(Self {
            http,
            base_url,
            model_id: config.model_id.clone(),
            dimension: config.dimension,
            api_key: config.api_key.clone(),
        })
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.base_url, self.model_id)
    }
}

#[async_trait]
impl EmbeddingProvider for BedrockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let started = Instant::now();
        let mut request = self
            .http
            .post(self.invoke_url())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&InvokeRequest { input_text: text });
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(transport_failure)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_failure(status, &body));
        }

        let payload: InvokeResponse = response.json().await.map_err(|err| {
            ReelError::embedding(
                EmbeddingFailureKind::Malformed,
                format!("undecodable response: {err}"),
            )
        })?;
        let embedding = payload.embedding.ok_or_else(|| {
            ReelError::embedding(
                EmbeddingFailureKind::Malformed,
                "response has no embedding field",
            )
        })?;
        if embedding.is_empty() {
            return Err(ReelError::embedding(
                EmbeddingFailureKind::Malformed,
                "response embedding is empty",
            ));
        }

        debug!(
            model = %self.model_id,
            dimension = embedding.len(),
            tokens = payload.input_text_token_count,
            elapsed_ms = started.elapsed().as_millis(),
            "embedded query text"
        );
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model_id
    }
}

fn transport_failure(err: reqwest::Error) -> ReelError {
    let kind = if err.is_timeout() {
        EmbeddingFailureKind::Timeout
    } else {
        EmbeddingFailureKind::Unreachable
    };
    ReelError::embedding(kind, err.to_string())
}

fn status_failure(status: StatusCode, body: &str) -> ReelError {
    let kind = match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
            EmbeddingFailureKind::Throttled
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => EmbeddingFailureKind::Timeout,
        _ => EmbeddingFailureKind::Rejected,
    };
    ReelError::embedding(kind, format!("status {status}: {body}"))
}
