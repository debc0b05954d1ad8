use proptest::prelude::*;
use serde_json::{Map, Value, json};

use reelsearch::search::normalize::normalize;
use reelsearch::store::{RawHit, RawHits, TotalHits};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|n| json!(n)),
        "[ -~]{0,16}".prop_map(Value::String),
    ]
}

fn field_value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(2, 8, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..3)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn document() -> impl Strategy<Value = Value> {
    let names = ["title", "plot", "genres", "rating", "year", "poster"];
    prop::collection::vec(proptest::option::of(field_value()), names.len()).prop_map(move |values| {
        let mut map = Map::new();
        for (name, value) in names.iter().zip(values) {
            if let Some(value) = value {
                map.insert((*name).to_string(), value);
            }
        }
        Value::Object(map)
    })
}

proptest! {
    #[test]
    fn normalization_is_total_and_order_preserving(
        docs in prop::collection::vec(document(), 0..8),
        total in proptest::option::of(0u64..1000),
    ) {
        let hits: Vec<RawHit> = docs
            .into_iter()
            .enumerate()
            .map(|(i, doc)| RawHit::from_source(i.to_string(), doc))
            .collect();
        let count = hits.len();
        let raw = RawHits { total: total.map(TotalHits::Count), hits };

        let result = normalize(&raw);
        prop_assert_eq!(result.records.len(), count);
        prop_assert_eq!(result.total_matched, total.unwrap_or(count as u64));
        for record in &result.records {
            prop_assert!(record.rating.is_finite());
        }
    }
}
