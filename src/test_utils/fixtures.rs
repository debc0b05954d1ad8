use serde_json::{Value, json};

/// Small movie catalog in the stored document shape. Ordered by descending
/// relevance for the "space adventure" query.
#[must_use]
pub fn movie_catalog() -> Vec<(String, Value)> {
    vec![
        movie(
            "tt0816692",
            "Interstellar",
            "A team of explorers travel through a wormhole in space.",
            &["Adventure", "Drama", "Sci-Fi"],
            8.6,
            2014,
        ),
        movie(
            "tt0076759",
            "Star Wars",
            "A farm boy joins a rebellion against a galactic empire.",
            &["Action", "Adventure", "Fantasy"],
            8.6,
            1977,
        ),
        movie(
            "tt3659388",
            "The Martian",
            "An astronaut stranded on Mars must survive alone.",
            &["Adventure", "Drama", "Sci-Fi"],
            8.0,
            2015,
        ),
        movie(
            "tt0378194",
            "Galaxy Quest",
            "Actors from a space show are mistaken for real heroes.",
            &["Adventure", "Comedy", "Sci-Fi"],
            7.4,
            1999,
        ),
        movie(
            "tt1454468",
            "Gravity",
            "Two astronauts work together after an accident in orbit.",
            &["Drama", "Sci-Fi", "Thriller"],
            7.7,
            2013,
        ),
    ]
}

fn movie(id: &str, title: &str, plot: &str, genres: &[&str], rating: f64, year: i64) -> (String, Value) {
    (
        id.to_string(),
        json!({
            "title": title,
            "plot": plot,
            "genres": genres,
            "rating": rating,
            "year": year,
            "poster": format!("https://posters.example.com/{id}.jpg"),
        }),
    )
}
