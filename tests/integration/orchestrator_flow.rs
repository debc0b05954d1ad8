use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::{Value, json};

use reelsearch::ReelError;
use reelsearch::config::{EmbeddingConfig, SearchConfig};
use reelsearch::embedding::BedrockEmbedder;
use reelsearch::search::{SearchOrchestrator, SearchRequest, SortKey};
use reelsearch::store::OpenSearchClient;
use reelsearch::test_utils::fixtures::movie_catalog;
use reelsearch::test_utils::stubs::{StubEmbedder, StubStore};

const SEARCH_PATH: &str = "/opensearch_movies/_search";

fn hits_page(count: usize, total: u64) -> Value {
    let hits: Vec<Value> = movie_catalog()
        .into_iter()
        .take(count)
        .map(|(id, source)| json!({"_id": id, "_score": 1.0, "_source": source}))
        .collect();
    json!({"took": 2, "hits": {"total": {"value": total, "relation": "eq"}, "hits": hits}})
}

fn live_orchestrator(embedding: &MockServer, store: &MockServer) -> SearchOrchestrator {
    let embedder = BedrockEmbedder::from_config(&EmbeddingConfig {
        endpoint: embedding.base_url(),
        dimension: 4,
        timeout_secs: 5,
        ..EmbeddingConfig::default()
    })
    .unwrap();
    let client = OpenSearchClient::from_config(&SearchConfig {
        endpoint: store.base_url(),
        timeout_secs: 5,
        ..SearchConfig::default()
    })
    .unwrap();
    SearchOrchestrator::new(Arc::new(embedder), Arc::new(client), "opensearch_movies")
}

async fn embedding_server(vector: Value) -> MockServer {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/model/amazon.titan-embed-text-v1/invoke");
            then.status(200).json_body(json!({"embedding": vector}));
        })
        .await;
    server
}

#[tokio::test]
async fn hybrid_search_over_http() {
    let embedding = embedding_server(json!([0.5, 0.25, 0.125, 0.75])).await;
    let store = MockServer::start_async().await;
    store
        .mock_async(|when, then| {
            when.method(POST).path(SEARCH_PATH);
            then.status(200).json_body(hits_page(3, 5));
        })
        .await;

    let request = SearchRequest::new("space adventure").with_sort(SortKey::Rating);
    let (vector, keyword) = live_orchestrator(&embedding, &store)
        .search(&request)
        .await
        .unwrap()
        .into_pair()
        .unwrap();

    assert_eq!(vector.records.len(), 3);
    assert_eq!(vector.total_matched, 5);
    assert_eq!(vector.records[0].title, "Interstellar");
    assert_eq!(vector.records[0].genres, "Adventure, Drama, Sci-Fi");
    assert_eq!(keyword, vector);
}

#[tokio::test]
async fn provider_dimension_drift_never_reaches_store() {
    let embedding = embedding_server(json!([0.5, 0.25])).await;
    // Nothing listens here: a store call would surface as StoreUnavailable.
    let embedder = BedrockEmbedder::from_config(&EmbeddingConfig {
        endpoint: embedding.base_url(),
        dimension: 4,
        timeout_secs: 5,
        ..EmbeddingConfig::default()
    })
    .unwrap();
    let client = OpenSearchClient::from_config(&SearchConfig {
        endpoint: "http://127.0.0.1:9".to_string(),
        timeout_secs: 5,
        ..SearchConfig::default()
    })
    .unwrap();
    let orchestrator =
        SearchOrchestrator::new(Arc::new(embedder), Arc::new(client), "opensearch_movies");

    let err = orchestrator
        .search(&SearchRequest::new("space adventure"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReelError::SchemaMismatch(_)));
}

#[tokio::test]
async fn store_outage_on_both_paths_fails() {
    let embedding = embedding_server(json!([0.5, 0.25, 0.125, 0.75])).await;
    let store = MockServer::start_async().await;
    store
        .mock_async(|when, then| {
            when.method(POST).path(SEARCH_PATH);
            then.status(503).body("unavailable");
        })
        .await;

    let err = live_orchestrator(&embedding, &store)
        .search(&SearchRequest::new("space adventure"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReelError::StoreUnavailable(_)));
}

#[tokio::test]
async fn genre_and_rating_filters_narrow_both_paths() {
    let embedder = Arc::new(StubEmbedder::new(4));
    let store = Arc::new(StubStore::with_movies(movie_catalog()));
    let orchestrator = SearchOrchestrator::new(embedder, store, "opensearch_movies");

    let request = SearchRequest::new("space adventure")
        .with_genre("Comedy")
        .with_min_rating(7.0);
    let (vector, keyword) = orchestrator.search(&request).await.unwrap().into_pair().unwrap();

    assert_eq!(vector.total_matched, 1);
    assert_eq!(vector.records[0].title, "Galaxy Quest");
    assert_eq!(keyword, vector);
}

#[tokio::test]
async fn year_sort_orders_newest_first() {
    let embedder = Arc::new(StubEmbedder::new(4));
    let store = Arc::new(StubStore::with_movies(movie_catalog()));
    let orchestrator = SearchOrchestrator::new(embedder, store, "opensearch_movies");

    let request = SearchRequest::new("space adventure")
        .with_sort(SortKey::Year)
        .with_limit(5);
    let (vector, _) = orchestrator.search(&request).await.unwrap().into_pair().unwrap();
    let years: Vec<i64> = vector.records.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2015, 2014, 2013, 1999, 1977]);
}
