use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use reelsearch::ReelError;
use reelsearch::config::EmbeddingConfig;
use reelsearch::embedding::{BedrockEmbedder, EmbeddingProvider};
use reelsearch::error::EmbeddingFailureKind;

const INVOKE_PATH: &str = "/model/amazon.titan-embed-text-v1/invoke";

fn config(server: &MockServer) -> EmbeddingConfig {
    EmbeddingConfig {
        endpoint: server.base_url(),
        dimension: 4,
        timeout_secs: 5,
        ..EmbeddingConfig::default()
    }
}

fn failure_kind(err: &ReelError) -> Option<EmbeddingFailureKind> {
    match err {
        ReelError::EmbeddingFailure { kind, .. } => Some(*kind),
        _ => None,
    }
}

#[tokio::test]
async fn embeds_query_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(INVOKE_PATH)
                .json_body(json!({"inputText": "space adventure"}));
            then.status(200)
                .json_body(json!({"embedding": [0.5, 0.25, 0.125, 0.75], "inputTextTokenCount": 2}));
        })
        .await;

    let embedder = BedrockEmbedder::from_config(&config(&server)).unwrap();
    let vector = embedder.embed("space adventure").await.unwrap();

    mock.assert_async().await;
    assert_eq!(vector, vec![0.5, 0.25, 0.125, 0.75]);
    assert_eq!(embedder.dimension(), 4);
}

#[tokio::test]
async fn sends_bearer_key_when_configured() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(INVOKE_PATH)
                .header("authorization", "Bearer test-key");
            then.status(200).json_body(json!({"embedding": [1.0]}));
        })
        .await;

    let mut cfg = config(&server);
    cfg.api_key = Some("test-key".to_string());
    let embedder = BedrockEmbedder::from_config(&cfg).unwrap();
    embedder.embed("anything").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn throttling_is_classified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(INVOKE_PATH);
            then.status(429).body("Too many requests");
        })
        .await;

    let embedder = BedrockEmbedder::from_config(&config(&server)).unwrap();
    let err = embedder.embed("space adventure").await.unwrap_err();
    assert_eq!(failure_kind(&err), Some(EmbeddingFailureKind::Throttled));
}

#[tokio::test]
async fn missing_embedding_is_malformed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(INVOKE_PATH);
            then.status(200).json_body(json!({"inputTextTokenCount": 2}));
        })
        .await;

    let embedder = BedrockEmbedder::from_config(&config(&server)).unwrap();
    let err = embedder.embed("space adventure").await.unwrap_err();
    assert_eq!(failure_kind(&err), Some(EmbeddingFailureKind::Malformed));
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(INVOKE_PATH);
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({"embedding": [1.0]}));
        })
        .await;

    let mut cfg = config(&server);
    cfg.timeout_secs = 1;
    let embedder = BedrockEmbedder::from_config(&cfg).unwrap();
    let err = embedder.embed("space adventure").await.unwrap_err();
    assert_eq!(failure_kind(&err), Some(EmbeddingFailureKind::Timeout));
}

#[tokio::test]
async fn unreachable_provider_is_classified() {
    let cfg = EmbeddingConfig {
        endpoint: "http://127.0.0.1:9".to_string(),
        timeout_secs: 5,
        ..EmbeddingConfig::default()
    };
    let embedder = BedrockEmbedder::from_config(&cfg).unwrap();
    let err = embedder.embed("space adventure").await.unwrap_err();
    assert_eq!(failure_kind(&err), Some(EmbeddingFailureKind::Unreachable));
}
