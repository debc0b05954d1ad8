//! Result normalization.
//!
//! Turns raw store hits into uniform display records. Normalization is
//! total: a hit missing a field, or carrying it in an unexpected shape,
//! yields the documented default for that field and never an error. Hit
//! order is preserved exactly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::store::{RawHit, RawHits};

/// One movie as shown to the caller. Every field is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    pub plot: String,
    pub genres: String,
    pub rating: f64,
    pub year: i64,
    pub poster_url: String,
}

/// Records from one query path plus the store's total match count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub records: Vec<MovieRecord>,
    pub total_matched: u64,
}

/// A document passage returned by passage retrieval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageRecord {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageResult {
    pub passages: Vec<PassageRecord>,
    pub total_matched: u64,
}

/// Movie fields as found on a hit, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialMovie {
    pub title: Option<String>,
    pub plot: Option<String>,
    pub genres: Option<String>,
    pub rating: Option<f64>,
    pub year: Option<i64>,
    pub poster: Option<String>,
}

impl PartialMovie {
    #[must_use]
    pub fn from_hit(hit: &RawHit) -> Self {
        Self {
            title: hit.field("title").and_then(text),
            plot: hit.field("plot").and_then(text),
            genres: hit.field("genres").and_then(text),
            rating: hit.field("rating").and_then(float),
            year: hit.field("year").and_then(integer),
            poster: hit.field("poster").and_then(text),
        }
    }

    /// Names of fields that will be defaulted.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.plot.is_none() {
            missing.push("plot");
        }
        if self.genres.is_none() {
            missing.push("genres");
        }
        if self.rating.is_none() {
            missing.push("rating");
        }
        if self.year.is_none() {
            missing.push("year");
        }
        if self.poster.is_none() {
            missing.push("poster");
        }
        missing
    }

    #[must_use]
    pub fn into_record(self) -> MovieRecord {
        MovieRecord {
            title: self.title.unwrap_or_default(),
            plot: self.plot.unwrap_or_default(),
            genres: self.genres.unwrap_or_default(),
            rating: self.rating.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            poster_url: self.poster.unwrap_or_default(),
        }
    }
}

/// Map raw hits to records, keeping store order and the store's total.
#[must_use]
pub fn normalize(hits: &RawHits) -> QueryResult {
    let records = hits.hits.iter().map(normalize_hit).collect();
    QueryResult {
        records,
        total_matched: hits.total_matched(),
    }
}

/// Like [`normalize`] but keeps at most `limit` records. The total is
/// unaffected.
#[must_use]
pub fn normalize_limited(hits: &RawHits, limit: usize) -> QueryResult {
    let records = hits.hits.iter().take(limit).map(normalize_hit).collect();
    QueryResult {
        records,
        total_matched: hits.total_matched(),
    }
}

fn normalize_hit(hit: &RawHit) -> MovieRecord {
    let partial = PartialMovie::from_hit(hit);
    let missing = partial.missing_fields();
    if !missing.is_empty() {
        warn!(
            hit = hit.id.as_deref().unwrap_or("<unknown>"),
            missing = ?missing,
            "hit missing fields; using defaults"
        );
    }
    partial.into_record()
}

#[must_use]
pub fn normalize_passages(hits: &RawHits, limit: usize) -> PassageResult {
    let passages = hits
        .hits
        .iter()
        .take(limit)
        .map(|hit| PassageRecord {
            title: hit.field("title").and_then(text).unwrap_or_default(),
            content: hit.field("content").and_then(text).unwrap_or_default(),
        })
        .collect();
    PassageResult {
        passages,
        total_matched: hits.total_matched(),
    }
}

/// Strings pass through, numbers are rendered, arrays are joined with ", ".
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Null | Value::Object(_) => None,
    }
}

fn float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Array(items) => items.first().and_then(float),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
        }
        Value::Array(items) => items.first().and_then(integer),
        _ => None,
    }
}
