use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, Result};

pub const DEFAULT_INDEX: &str = "opensearch_movies";
pub const DEFAULT_PASSAGE_INDEX: &str = "opensearch_documents";
pub const DEFAULT_MODEL_ID: &str = "amazon.titan-embed-text-v1";
pub const DEFAULT_DIMENSION: usize = 1536;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("REEL_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else if let Some(global) = Self::load_global()? {
            config.merge_patch(global);
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("reel/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| ReelError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| ReelError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.embedding {
            self.embedding.merge(patch);
        }
        if let Some(patch) = patch.query {
            self.query.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// The deployment variables (`AOSS_*`, `AWS_BEARER_TOKEN_BEDROCK`) are
    /// applied first so the `REEL_*` variables can refine them.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        if let Some(value) = env.string("AOSS_VECTORSEARCH_ENDPOINT") {
            self.search.endpoint = value;
        }
        if let Some(value) = env.string("AOSS_VECTORSEARCH_REGION") {
            self.search.region.clone_from(&value);
            if self.embedding.region.is_empty() {
                self.embedding.region = value;
            }
        }
        if let Some(value) = env.string("AOSS_BEDROCK_ASSUME_ROLE") {
            self.embedding.assume_role = Some(value);
        }
        if let Some(value) = env.string("AWS_BEARER_TOKEN_BEDROCK") {
            self.embedding.api_key = Some(value);
        }

        if let Some(value) = env.string("REEL_SEARCH_ENDPOINT") {
            self.search.endpoint = value;
        }
        if let Some(value) = env.string("REEL_SEARCH_REGION") {
            self.search.region = value;
        }
        if let Some(value) = env.string("REEL_SEARCH_INDEX") {
            self.search.index = value;
        }
        if let Some(value) = env.string("REEL_SEARCH_TOKEN") {
            self.search.auth_token = Some(value);
        }
        if let Some(value) = env.u64("REEL_SEARCH_TIMEOUT_SECS")? {
            self.search.timeout_secs = value;
        }

        if let Some(value) = env.string("REEL_EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = value;
        }
        if let Some(value) = env.string("REEL_EMBEDDING_REGION") {
            self.embedding.region = value;
        }
        if let Some(value) = env.string("REEL_EMBEDDING_MODEL_ID") {
            self.embedding.model_id = value;
        }
        if let Some(value) = env.usize("REEL_EMBEDDING_DIMENSION")? {
            self.embedding.dimension = value;
        }
        if let Some(value) = env.u64("REEL_EMBEDDING_TIMEOUT_SECS")? {
            self.embedding.timeout_secs = value;
        }

        if let Some(value) = env.usize("REEL_QUERY_RESULT_LIMIT")? {
            self.query.result_limit = value;
        }
        if let Some(value) = env.usize("REEL_QUERY_LOOKUP_LIMIT")? {
            self.query.lookup_limit = value;
        }
        if let Some(value) = env.string("REEL_QUERY_PASSAGE_INDEX") {
            self.query.passage_index = value;
        }

        Ok(())
    }

    /// Copy of the config safe to print: secrets replaced by a marker.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.search.auth_token.is_some() {
            copy.search.auth_token = Some("<redacted>".to_string());
        }
        if copy.embedding.api_key.is_some() {
            copy.embedding.api_key = Some("<redacted>".to_string());
        }
        copy
    }
}

/// Connection settings for the search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Host name or URL of the search endpoint.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: String::new(),
            index: DEFAULT_INDEX.to_string(),
            auth_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.endpoint {
            self.endpoint = value;
        }
        if let Some(value) = patch.region {
            self.region = value;
        }
        if let Some(value) = patch.index {
            self.index = value;
        }
        if let Some(value) = patch.auth_token {
            self.auth_token = Some(value);
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
    }

    /// Base URL of the search endpoint. Bare hosts are addressed over HTTPS.
    pub fn base_url(&self) -> Result<String> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ReelError::MissingConfig(
                "search endpoint is empty; set AOSS_VECTORSEARCH_ENDPOINT or [search].endpoint"
                    .to_string(),
            ));
        }
        Ok(with_scheme(endpoint))
    }
}

/// Settings for the managed embedding model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Runtime endpoint; derived from `region` when empty.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub dimension: usize,
    #[serde(default)]
    pub assume_role: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: String::new(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            dimension: DEFAULT_DIMENSION,
            assume_role: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EmbeddingConfig {
    fn merge(&mut self, patch: EmbeddingPatch) {
        if let Some(value) = patch.endpoint {
            self.endpoint = value;
        }
        if let Some(value) = patch.region {
            self.region = value;
        }
        if let Some(value) = patch.model_id {
            self.model_id = value;
        }
        if let Some(value) = patch.dimension {
            self.dimension = value;
        }
        if let Some(value) = patch.assume_role {
            self.assume_role = Some(value);
        }
        if let Some(value) = patch.api_key {
            self.api_key = Some(value);
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
    }

    pub fn base_url(&self) -> Result<String> {
        let endpoint = self.endpoint.trim();
        if !endpoint.is_empty() {
            return Ok(with_scheme(endpoint));
        }
        let region = self.region.trim();
        if region.is_empty() {
            return Err(ReelError::MissingConfig(
                "embedding endpoint and region are both empty; set AOSS_VECTORSEARCH_REGION"
                    .to_string(),
            ));
        }
        Ok(format!("https://bedrock-runtime.{region}.amazonaws.com"))
    }
}

/// Per-request defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub result_limit: usize,
    #[serde(default)]
    pub lookup_limit: usize,
    #[serde(default)]
    pub passage_index: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            result_limit: 3,
            lookup_limit: 20,
            passage_index: DEFAULT_PASSAGE_INDEX.to_string(),
        }
    }
}

impl QueryConfig {
    fn merge(&mut self, patch: QueryPatch) {
        if let Some(value) = patch.result_limit {
            self.result_limit = value;
        }
        if let Some(value) = patch.lookup_limit {
            self.lookup_limit = value;
        }
        if let Some(value) = patch.passage_index {
            self.passage_index = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub search: Option<SearchPatch>,
    pub embedding: Option<EmbeddingPatch>,
    pub query: Option<QueryPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub index: Option<String>,
    pub auth_token: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EmbeddingPatch {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub model_id: Option<String>,
    pub dimension: Option<usize>,
    pub assume_role: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct QueryPatch {
    pub result_limit: Option<usize>,
    pub lookup_limit: Option<usize>,
    pub passage_index: Option<String>,
}

fn with_scheme(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn u64(&self, key: &str) -> Result<Option<u64>> {
        match self.string(key) {
            Some(value) => value.trim().parse::<u64>().map(Some).map_err(|err| {
                ReelError::Config(format!("invalid {key} value {value}: {err}"))
            }),
            None => Ok(None),
        }
    }

    fn usize(&self, key: &str) -> Result<Option<usize>> {
        match self.string(key) {
            Some(value) => value.trim().parse::<usize>().map(Some).map_err(|err| {
                ReelError::Config(format!("invalid {key} value {value}: {err}"))
            }),
            None => Ok(None),
        }
    }
}
