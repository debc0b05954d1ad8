//! Document store boundary.
//!
//! The store is an external search engine with KNN and full-text support.
//! This module defines the trait the orchestrator talks to and the loosely
//! shaped response envelope it returns. Hits are decoded leniently here and
//! turned into records by [`crate::search::normalize`].

pub mod opensearch;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Result;
use crate::search::query::SearchBody;

pub use opensearch::OpenSearchClient;

/// A search engine that accepts structured query bodies.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run `body` against `index` and return the raw hit envelope.
    async fn search(&self, index: &str, body: &SearchBody) -> Result<RawSearchResponse>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Top-level search response. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub took: Option<u64>,
    #[serde(default)]
    pub hits: RawHits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHits {
    #[serde(default, deserialize_with = "lenient_total")]
    pub total: Option<TotalHits>,
    #[serde(default, deserialize_with = "lenient_hits")]
    pub hits: Vec<RawHit>,
}

/// An unrecognized total shape is treated as untracked.
fn lenient_total<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<TotalHits>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode hits one by one so a single odd hit cannot reject the page.
fn lenient_hits<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<RawHit>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let hit = RawHit::from_value(item);
            if hit.is_none() {
                warn!("skipping hit that is not an object");
            }
            hit
        })
        .collect())
}

impl RawHits {
    /// Total reported by the store, or the number of returned hits when the
    /// store did not track a total.
    #[must_use]
    pub fn total_matched(&self) -> u64 {
        self.total
            .as_ref()
            .map_or(self.hits.len() as u64, TotalHits::value)
    }
}

/// Total hit count, reported either as an object or a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Tracked {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
}

impl TotalHits {
    #[must_use]
    pub const fn value(&self) -> u64 {
        match self {
            Self::Count(value) | Self::Tracked { value, .. } => *value,
        }
    }
}

/// One hit: a partial field map in `_source` and/or `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawHit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
    #[serde(default)]
    pub fields: Option<Value>,
}

impl RawHit {
    /// Build a hit carrying `source` as its `_source` document.
    #[must_use]
    pub fn from_source(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: Some(id.into()),
            score: None,
            source: Some(source),
            fields: None,
        }
    }

    /// Build a hit from one raw JSON hit, ignoring metadata of the wrong
    /// type. `None` when the hit is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };
        let id = match map.remove("_id") {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        let score = map.get("_score").and_then(Value::as_f64);
        let source = map.remove("_source").filter(|v| !v.is_null());
        let fields = map.remove("fields").filter(|v| !v.is_null());
        Some(Self {
            id,
            score,
            source,
            fields,
        })
    }

    /// Look up a projected field, preferring `_source` over `fields`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        lookup(self.source.as_ref(), name).or_else(|| lookup(self.fields.as_ref(), name))
    }
}

impl<'de> Deserialize<'de> for RawHit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).ok_or_else(|| serde::de::Error::custom("hit is not an object"))
    }
}

fn lookup<'a>(container: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    container
        .and_then(Value::as_object)
        .and_then(|map: &'a Map<String, Value>| map.get(name))
        .filter(|value| !value.is_null())
}
