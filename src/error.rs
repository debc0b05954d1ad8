//! Error types for reelsearch.

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReelError>;

/// Why the embedding provider could not produce a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingFailureKind {
    /// Connection refused, DNS failure, TLS failure.
    Unreachable,
    /// No response within the configured timeout.
    Timeout,
    /// Quota exhausted or request throttled.
    Throttled,
    /// The provider answered with a non-success status.
    Rejected,
    /// The provider answered, but without a usable embedding.
    Malformed,
}

impl EmbeddingFailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::Timeout => "timeout",
            Self::Throttled => "throttled",
            Self::Rejected => "rejected",
            Self::Malformed => "malformed",
        }
    }
}

impl fmt::Display for EmbeddingFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ReelError {
    #[error("embedding failed ({kind}): {message}")]
    EmbeddingFailure {
        kind: EmbeddingFailureKind,
        message: String,
    },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("search store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("search store rejected credentials: {0}")]
    StoreUnauthorized(String),

    #[error("search cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReelError {
    pub fn embedding(kind: EmbeddingFailureKind, message: impl Into<String>) -> Self {
        Self::EmbeddingFailure {
            kind,
            message: message.into(),
        }
    }

    /// Stable machine-readable code used by robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmbeddingFailure { .. } => "embedding_failure",
            Self::SchemaMismatch(_) => "schema_mismatch",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::StoreUnauthorized(_) => "store_unauthorized",
            Self::Cancelled => "cancelled",
            Self::Config(_) => "config",
            Self::MissingConfig(_) => "missing_config",
            Self::ValidationFailed(_) => "validation_failed",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }

    /// True when the failure only concerns one store call and the other
    /// query path can still be reported.
    #[must_use]
    pub const fn is_path_local(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
