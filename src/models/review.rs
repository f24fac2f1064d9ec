use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest accepted review rating
pub const RATING_MIN: i32 = 1;
/// Highest accepted review rating
pub const RATING_MAX: i32 = 5;

/// A user's rating of a movie, with an optional free-text comment.
///
/// Reviews are insert-only: the service never edits or deletes them, and a
/// user may review the same movie more than once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub user_id: Uuid,
    /// Integer rating in `RATING_MIN..=RATING_MAX`
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(movie_id: Uuid, user_id: Uuid, rating: i32, comment: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            movie_id,
            user_id,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a rating value is inside the accepted range
    pub fn rating_in_range(rating: i32) -> bool {
        (RATING_MIN..=RATING_MAX).contains(&rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_range_boundaries() {
        assert!(!Review::rating_in_range(0));
        assert!(Review::rating_in_range(1));
        assert!(Review::rating_in_range(5));
        assert!(!Review::rating_in_range(6));
    }

    #[test]
    fn test_review_serializes_camel_case() {
        let review = Review::new(Uuid::new_v4(), Uuid::new_v4(), 4, "solid".to_string());
        let json = serde_json::to_value(&review).unwrap();
        assert!(json.get("movieId").is_some());
        assert!(json.get("userId").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
