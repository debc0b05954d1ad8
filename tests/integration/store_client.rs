use httpmock::prelude::*;
use serde_json::json;

use reelsearch::ReelError;
use reelsearch::config::SearchConfig;
use reelsearch::search::{HybridQueryBuilder, SearchRequest};
use reelsearch::store::{DocumentStore, OpenSearchClient};

const SEARCH_PATH: &str = "/opensearch_movies/_search";

fn client(server: &MockServer) -> OpenSearchClient {
    let config = SearchConfig {
        endpoint: server.base_url(),
        timeout_secs: 5,
        ..SearchConfig::default()
    };
    OpenSearchClient::from_config(&config).unwrap()
}

fn keyword_body() -> reelsearch::search::SearchBody {
    let (_, keyword) = HybridQueryBuilder::default().build(&SearchRequest::new("heist"), &[0.5]);
    keyword.0
}

#[tokio::test]
async fn returns_hits_and_total() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(SEARCH_PATH);
            then.status(200).json_body(json!({
                "took": 4,
                "hits": {
                    "total": {"value": 12, "relation": "eq"},
                    "hits": [
                        {"_id": "1", "_score": 3.5, "_source": {"title": "Heat", "year": 1995}},
                        {"_id": "2", "_score": 2.0, "_source": {"title": "Inside Man"}}
                    ]
                }
            }));
        })
        .await;

    let response = client(&server)
        .search("opensearch_movies", &keyword_body())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.hits.total_matched(), 12);
    assert_eq!(response.hits.hits.len(), 2);
    assert_eq!(response.took, Some(4));
}

#[tokio::test]
async fn odd_hit_keeps_the_rest_of_the_page() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(SEARCH_PATH);
            then.status(200).json_body(json!({
                "hits": {
                    "total": {"value": 2, "relation": "eq"},
                    "hits": [
                        {"_id": "1", "_score": 3.5, "_source": {"title": "Heat"}},
                        {"_id": 2, "_score": "n/a", "_source": {"title": "Ronin"}}
                    ]
                }
            }));
        })
        .await;

    let response = client(&server)
        .search("opensearch_movies", &keyword_body())
        .await
        .unwrap();

    let titles: Vec<_> = response
        .hits
        .hits
        .iter()
        .filter_map(|hit| hit.field("title"))
        .collect();
    assert_eq!(titles, vec![&json!("Heat"), &json!("Ronin")]);
    assert_eq!(response.hits.hits[1].id.as_deref(), Some("2"));
}

#[tokio::test]
async fn sends_query_dsl_body() {
    let server = MockServer::start_async().await;
    let body = keyword_body();
    let expected = serde_json::to_value(&body).unwrap();
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(SEARCH_PATH).json_body(expected);
            then.status(200).json_body(json!({"hits": {"total": 0, "hits": []}}));
        })
        .await;

    client(&server).search("opensearch_movies", &body).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn forbidden_is_unauthorized() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(SEARCH_PATH);
            then.status(403).body("Forbidden");
        })
        .await;

    let err = client(&server)
        .search("opensearch_movies", &keyword_body())
        .await
        .unwrap_err();
    assert!(matches!(err, ReelError::StoreUnauthorized(_)));
}

#[tokio::test]
async fn dimension_rejection_is_schema_mismatch() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(SEARCH_PATH);
            then.status(400).json_body(json!({
                "error": {"reason": "Query vector has invalid dimension: 1. Dimension should be: 1536"},
                "status": 400
            }));
        })
        .await;

    let err = client(&server)
        .search("opensearch_movies", &keyword_body())
        .await
        .unwrap_err();
    assert!(matches!(err, ReelError::SchemaMismatch(_)));
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(SEARCH_PATH);
            then.status(503).body("overloaded");
        })
        .await;

    let err = client(&server)
        .search("opensearch_movies", &keyword_body())
        .await
        .unwrap_err();
    assert!(matches!(err, ReelError::StoreUnavailable(_)));
}

#[tokio::test]
async fn undecodable_body_is_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(SEARCH_PATH);
            then.status(200).body("<html>gateway</html>");
        })
        .await;

    let err = client(&server)
        .search("opensearch_movies", &keyword_body())
        .await
        .unwrap_err();
    assert!(matches!(err, ReelError::StoreUnavailable(_)));
}
