//! Search inputs and the local normalization applied to them.
//!
//! Nothing here fails: unknown sort keys, empty genre expressions and
//! missing or nonsensical rating floors are defaulted rather than rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Genre expression meaning "no restriction".
pub const ANY_GENRE: &str = "*";

/// Largest neighbor count / page size sent to the store.
pub const MAX_RESULT_LIMIT: usize = 10_000;

/// Result limit for the side-by-side comparison view.
pub const DEFAULT_RESULT_LIMIT: usize = 3;

/// Result limit for the single-field title lookup.
pub const DEFAULT_LOOKUP_LIMIT: usize = 20;

/// Ordering applied by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Engine-native relevance score.
    #[default]
    Relevance,
    Year,
    Rating,
}

impl SortKey {
    /// Field name the store sorts on, descending.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Relevance => "_score",
            Self::Year => "year",
            Self::Rating => "rating",
        }
    }

    /// Parse user input, falling back to relevance for anything unrecognized.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "" | "score" | "_score" | "relevance" => Ok(Self::Relevance),
            "year" => Ok(Self::Year),
            "rating" => Ok(Self::Rating),
            other => Err(format!("unknown sort key {other}")),
        }
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Self::parse_lenient).unwrap_or_default())
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Relevance => "relevance",
            Self::Year => "year",
            Self::Rating => "rating",
        };
        f.write_str(name)
    }
}

/// One user search, shared by the vector and keyword paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query_text: String,
    #[serde(default)]
    pub sort_key: SortKey,
    /// Search-engine filter expression over genres.
    #[serde(default, deserialize_with = "lenient_genre")]
    pub genre_filter: String,
    /// Inclusive lower bound on rating.
    #[serde(default, deserialize_with = "lenient_rating")]
    pub min_rating: Option<f64>,
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
}

const fn default_result_limit() -> usize {
    DEFAULT_RESULT_LIMIT
}

/// Anything but a string decodes as the empty expression.
fn lenient_genre<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

/// Numbers and numeric strings are kept; anything else is no floor.
fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl SearchRequest {
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            sort_key: SortKey::Relevance,
            genre_filter: ANY_GENRE.to_string(),
            min_rating: None,
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }

    #[must_use]
    pub const fn with_sort(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    #[must_use]
    pub fn with_genre(mut self, genre_filter: impl Into<String>) -> Self {
        self.genre_filter = genre_filter.into();
        self
    }

    #[must_use]
    pub const fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }

    /// Genre expression with empty input mapped to the wildcard.
    #[must_use]
    pub fn effective_genre(&self) -> &str {
        normalize_genre(&self.genre_filter)
    }

    #[must_use]
    pub fn effective_min_rating(&self) -> f64 {
        normalize_min_rating(self.min_rating)
    }

    #[must_use]
    pub fn effective_limit(&self) -> usize {
        clamp_limit(self.result_limit)
    }
}

#[must_use]
pub fn normalize_genre(genre: &str) -> &str {
    let trimmed = genre.trim();
    if trimmed.is_empty() { ANY_GENRE } else { trimmed }
}

#[must_use]
pub fn normalize_min_rating(min_rating: Option<f64>) -> f64 {
    match min_rating {
        Some(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

#[must_use]
pub const fn clamp_limit(limit: usize) -> usize {
    if limit == 0 {
        1
    } else if limit > MAX_RESULT_LIMIT {
        MAX_RESULT_LIMIT
    } else {
        limit
    }
}
