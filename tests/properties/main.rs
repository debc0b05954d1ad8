//! Property suite for query construction and normalization.

mod normalize_props;
mod query_props;
