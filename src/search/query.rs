//! Hybrid query construction.
//!
//! Builds the two request bodies issued for one [`SearchRequest`]: a KNN
//! body that ORs similarity over several vector fields, and a keyword body
//! that matches the text fields. Both share the same hard filters and sort.
//! The types serialize directly into the engine's JSON query DSL.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::search::request::{SearchRequest, clamp_limit};

/// Field layout of the movie index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySchema {
    /// Vector fields searched with OR semantics.
    pub vector_fields: Vec<String>,
    /// Text fields used by the keyword match.
    pub text_fields: Vec<String>,
    pub genre_field: String,
    pub rating_field: String,
    /// Source fields returned for every hit.
    pub projection: Vec<String>,
    /// Vector field used by the single-field title lookup.
    pub title_vector_field: String,
}

impl Default for QuerySchema {
    fn default() -> Self {
        Self {
            vector_fields: vec!["v_plot".to_string(), "v_title".to_string()],
            text_fields: vec!["plot".to_string(), "title".to_string()],
            genre_field: "genres".to_string(),
            rating_field: "rating".to_string(),
            projection: ["title", "plot", "rating", "year", "poster", "genres"]
                .into_iter()
                .map(String::from)
                .collect(),
            title_vector_field: "v_title".to_string(),
        }
    }
}

/// A complete search request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchBody {
    pub size: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<BTreeMap<String, SortOrder>>,
    #[serde(rename = "_source")]
    pub source: SourceFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    pub query: Query,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    pub order: &'static str,
}

impl SortOrder {
    #[must_use]
    pub const fn desc() -> Self {
        Self { order: "desc" }
    }
}

/// `_source` handling: either disabled or an include list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SourceFilter {
    Enabled(bool),
    Includes { includes: Vec<String> },
}

/// Query DSL clauses used by this crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Bool(BoolQuery),
    Knn(BTreeMap<String, KnnClause>),
    MultiMatch(MultiMatch),
    QueryString(QueryString),
    Range(BTreeMap<String, RangeBound>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Query>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnnClause {
    pub vector: Vec<f32>,
    pub k: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiMatch {
    pub query: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryString {
    pub query: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBound {
    pub gte: f64,
}

impl Query {
    fn knn(field: &str, vector: &[f32], k: usize) -> Self {
        let mut clause = BTreeMap::new();
        clause.insert(
            field.to_string(),
            KnnClause {
                vector: vector.to_vec(),
                k,
            },
        );
        Self::Knn(clause)
    }

    fn at_least(field: &str, gte: f64) -> Self {
        let mut bound = BTreeMap::new();
        bound.insert(field.to_string(), RangeBound { gte });
        Self::Range(bound)
    }
}

/// Body for the vector-similarity path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VectorQueryBody(pub SearchBody);

/// Body for the keyword path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeywordQueryBody(pub SearchBody);

impl VectorQueryBody {
    #[must_use]
    pub const fn body(&self) -> &SearchBody {
        &self.0
    }
}

impl KeywordQueryBody {
    #[must_use]
    pub const fn body(&self) -> &SearchBody {
        &self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct HybridQueryBuilder {
    schema: QuerySchema,
}

impl HybridQueryBuilder {
    #[must_use]
    pub const fn new(schema: QuerySchema) -> Self {
        Self { schema }
    }

    #[must_use]
    pub const fn schema(&self) -> &QuerySchema {
        &self.schema
    }

    /// Build the vector and keyword bodies for one request.
    ///
    /// The embedding is only placed in the vector body; the keyword body
    /// matches on the raw query text.
    #[must_use]
    pub fn build(
        &self,
        request: &SearchRequest,
        embedding: &[f32],
    ) -> (VectorQueryBody, KeywordQueryBody) {
        let limit = request.effective_limit();
        let filters = self.filters(request);
        let sort = vec![sort_clause(request.sort_key.field())];

        let should = self
            .schema
            .vector_fields
            .iter()
            .map(|field| Query::knn(field, embedding, limit))
            .collect();

        let vector = SearchBody {
            size: limit,
            sort: sort.clone(),
            source: self.projection(),
            fields: None,
            query: Query::Bool(BoolQuery {
                should,
                must: Vec::new(),
                filter: filters.clone(),
            }),
        };

        let keyword = SearchBody {
            size: limit,
            sort,
            source: self.projection(),
            fields: None,
            query: Query::Bool(BoolQuery {
                should: Vec::new(),
                must: vec![Query::MultiMatch(MultiMatch {
                    query: request.query_text.clone(),
                    fields: self.schema.text_fields.clone(),
                })],
                filter: filters,
            }),
        };

        (VectorQueryBody(vector), KeywordQueryBody(keyword))
    }

    /// Single-field KNN over the title vectors, returning title and plot
    /// through the `fields` projection.
    #[must_use]
    pub fn title_lookup(&self, embedding: &[f32], limit: usize) -> SearchBody {
        vector_lookup(
            &self.schema.title_vector_field,
            embedding,
            limit,
            &["title", "plot"],
        )
    }

    fn filters(&self, request: &SearchRequest) -> Vec<Query> {
        vec![
            Query::QueryString(QueryString {
                query: request.effective_genre().to_string(),
                fields: vec![self.schema.genre_field.clone()],
            }),
            Query::at_least(&self.schema.rating_field, request.effective_min_rating()),
        ]
    }

    fn projection(&self) -> SourceFilter {
        SourceFilter::Includes {
            includes: self.schema.projection.clone(),
        }
    }
}

/// Plain KNN body against one vector field with `_source` disabled.
#[must_use]
pub fn vector_lookup(field: &str, embedding: &[f32], limit: usize, fields: &[&str]) -> SearchBody {
    let limit = clamp_limit(limit);
    SearchBody {
        size: limit,
        sort: Vec::new(),
        source: SourceFilter::Enabled(false),
        fields: Some(fields.iter().map(|f| (*f).to_string()).collect()),
        query: Query::knn(field, embedding, limit),
    }
}

fn sort_clause(field: &str) -> BTreeMap<String, SortOrder> {
    let mut clause = BTreeMap::new();
    clause.insert(field.to_string(), SortOrder::desc());
    clause
}
