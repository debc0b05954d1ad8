//! Embedding provider boundary.
//!
//! An embedding provider turns text into a fixed-length vector. The
//! production implementation calls a managed model over HTTP; tests use the
//! deterministic stubs in [`crate::test_utils`].

pub mod bedrock;

use async_trait::async_trait;

use crate::error::Result;

pub use bedrock::BedrockEmbedder;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` into a vector of [`Self::dimension`] floats.
    ///
    /// Every failure is reported as `ReelError::EmbeddingFailure`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimension of the vectors this provider produces.
    fn dimension(&self) -> usize;

    /// Model name for logs.
    fn name(&self) -> &str;
}
