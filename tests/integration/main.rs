//! Integration suite: HTTP clients against a mock server and end-to-end
//! orchestration.

mod embedding_client;
mod orchestrator_flow;
mod store_client;
