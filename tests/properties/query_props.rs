use proptest::prelude::*;
use serde_json::Value;

use reelsearch::search::request::{MAX_RESULT_LIMIT, normalize_genre};
use reelsearch::search::{HybridQueryBuilder, SearchRequest, SortKey};

fn bodies(request: &SearchRequest) -> (Value, Value) {
    let (vector, keyword) = HybridQueryBuilder::default().build(request, &[0.5, 0.25]);
    (
        serde_json::to_value(&vector).unwrap(),
        serde_json::to_value(&keyword).unwrap(),
    )
}

proptest! {
    #[test]
    fn blank_genre_means_any(blank in "[ \t]{0,6}") {
        prop_assert_eq!(normalize_genre(&blank), "*");
        let with_blank = bodies(&SearchRequest::new("q").with_genre(blank));
        let with_star = bodies(&SearchRequest::new("q").with_genre("*"));
        prop_assert_eq!(with_blank, with_star);
    }

    #[test]
    fn non_positive_rating_floor_is_zero(floor in -100.0f64..=0.0) {
        let absent = bodies(&SearchRequest::new("q"));
        let given = bodies(&SearchRequest::new("q").with_min_rating(floor));
        prop_assert_eq!(absent, given);
    }

    #[test]
    fn size_and_k_stay_in_bounds(limit in 0usize..50_000) {
        let (vector, keyword) = bodies(&SearchRequest::new("q").with_limit(limit));
        let size = vector["size"].as_u64().unwrap();
        prop_assert!((1..=MAX_RESULT_LIMIT as u64).contains(&size));
        prop_assert_eq!(&keyword["size"], &vector["size"]);
        for clause in vector["query"]["bool"]["should"].as_array().unwrap() {
            let knn = clause["knn"].as_object().unwrap();
            for (_, field) in knn {
                prop_assert_eq!(field["k"].as_u64().unwrap(), size);
            }
        }
    }

    #[test]
    fn paths_share_filters_and_sort(
        sort in "[a-z_]{0,10}",
        genre in "[A-Za-z*]{0,10}",
        floor in proptest::option::of(0.0f64..10.0),
    ) {
        let mut request = SearchRequest::new("space adventure")
            .with_sort(SortKey::parse_lenient(&sort))
            .with_genre(genre);
        if let Some(floor) = floor {
            request = request.with_min_rating(floor);
        }
        let (vector, keyword) = bodies(&request);
        prop_assert_eq!(&vector["sort"], &keyword["sort"]);
        prop_assert_eq!(&vector["query"]["bool"]["filter"], &keyword["query"]["bool"]["filter"]);
        prop_assert_eq!(&vector["_source"], &keyword["_source"]);
        prop_assert!(keyword["query"]["bool"].get("should").is_none());
    }

    #[test]
    fn unknown_sort_keys_sort_by_score(sort in "[a-z]{1,12}") {
        prop_assume!(!matches!(sort.as_str(), "year" | "rating" | "score" | "relevance"));
        let (vector, _) = bodies(&SearchRequest::new("q").with_sort(SortKey::parse_lenient(&sort)));
        prop_assert!(vector["sort"][0]["_score"].is_object());
    }
}
