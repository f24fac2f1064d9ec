use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry for a single movie.
///
/// The `rating_sum`/`rating_count` pair is owned by the rating aggregator
/// and only changes when a review is recorded; movie updates never touch it.
/// `rating` is the derived average, kept in sync with the pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    /// Unique identifier, immutable for the lifetime of the movie
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Genre tags in insertion order
    pub genre: Vec<String>,
    pub year: i32,
    /// Runtime in minutes
    pub duration: i32,
    /// Average review rating; 0.0 until the first review exists
    pub rating: f64,
    pub rating_count: i64,
    #[serde(skip, default)]
    pub rating_sum: i64,
    pub poster_url: String,
    /// Path to the video file; empty means the movie cannot be watched
    pub video_url: String,
    pub director: String,
    /// Cast members in insertion order
    pub cast: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// Creates a new movie with the mandatory fields; everything else
    /// starts at its default and can be filled in before storing.
    pub fn new(title: String, year: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description: String::new(),
            genre: Vec::new(),
            year,
            duration: 0,
            rating: 0.0,
            rating_count: 0,
            rating_sum: 0,
            poster_url: String::new(),
            video_url: String::new(),
            director: String::new(),
            cast: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the movie carries the given genre tag (exact, case-sensitive)
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genre.iter().any(|g| g == genre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_movie_defaults() {
        let movie = Movie::new("Heat".to_string(), 1995);
        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.year, 1995);
        assert_eq!(movie.rating, 0.0);
        assert_eq!(movie.rating_count, 0);
        assert!(movie.genre.is_empty());
        assert!(movie.video_url.is_empty());
    }

    #[test]
    fn test_has_genre_is_case_sensitive() {
        let mut movie = Movie::new("Heat".to_string(), 1995);
        movie.genre = vec!["Action".to_string(), "Crime".to_string()];
        assert!(movie.has_genre("Action"));
        assert!(!movie.has_genre("action"));
        assert!(!movie.has_genre("Drama"));
    }

    #[test]
    fn test_rating_sum_not_serialized() {
        let mut movie = Movie::new("Heat".to_string(), 1995);
        movie.rating_sum = 42;
        let json = serde_json::to_value(&movie).unwrap();
        assert!(json.get("ratingSum").is_none());
        assert!(json.get("ratingCount").is_some());
        assert!(json.get("posterUrl").is_some());
    }
}
