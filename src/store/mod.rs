mod aggregate;
mod memory;
mod postgres;

pub use aggregate::RatingAggregate;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Movie, Review, User};

/// Filter applied by [`Store::list_movies`].
///
/// All criteria are combined with AND; the result set is unordered, the
/// catalog query engine is responsible for ordering and pagination.
#[derive(Debug, Default, Clone)]
pub struct MovieFilter {
    /// Case-insensitive substring match against title or description
    pub search: Option<String>,
    /// Exact, case-sensitive genre tag
    pub genre: Option<String>,
    /// Exact release year
    pub year: Option<i32>,
}

impl MovieFilter {
    /// Whether a movie satisfies every criterion of the filter.
    ///
    /// This is the single source of truth for filter semantics; the SQL
    /// store mirrors it with equivalent WHERE clauses.
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = movie.title.to_lowercase().contains(&term)
                || movie.description.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(genre) = &self.genre {
            if !movie.has_genre(genre) {
                return false;
            }
        }
        if let Some(year) = self.year {
            if movie.year != year {
                return false;
            }
        }
        true
    }
}

/// Partial movie update; `None` leaves a field unchanged.
///
/// The rating aggregate is deliberately absent: it is owned by the rating
/// aggregator and cannot be written through the update path.
#[derive(Debug, Default, Clone)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub year: Option<i32>,
    pub duration: Option<i32>,
    pub poster_url: Option<String>,
    pub video_url: Option<String>,
    pub director: Option<String>,
    pub cast: Option<Vec<String>>,
}

impl MovieUpdate {
    /// Applies the update in place and bumps `updated_at`.
    pub fn apply_to(&self, movie: &mut Movie) {
        if let Some(title) = &self.title {
            movie.title = title.clone();
        }
        if let Some(description) = &self.description {
            movie.description = description.clone();
        }
        if let Some(genre) = &self.genre {
            movie.genre = genre.clone();
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(duration) = self.duration {
            movie.duration = duration;
        }
        if let Some(poster_url) = &self.poster_url {
            movie.poster_url = poster_url.clone();
        }
        if let Some(video_url) = &self.video_url {
            movie.video_url = video_url.clone();
        }
        if let Some(director) = &self.director {
            movie.director = director.clone();
        }
        if let Some(cast) = &self.cast {
            movie.cast = cast.clone();
        }
        movie.updated_at = chrono::Utc::now();
    }
}

/// Durable persistence for movies, reviews and users.
///
/// All writes are atomic per entity. [`Store::create_review`] additionally
/// folds the rating aggregate update into the same atomic unit, so a review
/// is never durable without its effect on the movie's average.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn create_movie(&self, movie: Movie) -> AppResult<Movie>;
    /// Fails with NotFound when the id is unknown
    async fn get_movie(&self, id: Uuid) -> AppResult<Movie>;
    async fn update_movie(&self, id: Uuid, update: MovieUpdate) -> AppResult<Movie>;
    /// Deletes the movie and its reviews; NotFound when the id is unknown
    async fn delete_movie(&self, id: Uuid) -> AppResult<()>;
    /// Unordered set of movies matching the filter
    async fn list_movies(&self, filter: &MovieFilter) -> AppResult<Vec<Movie>>;

    /// Inserts the review and updates the movie's rating aggregate as one
    /// atomic unit; NotFound when the movie no longer exists
    async fn create_review(&self, review: Review) -> AppResult<Review>;
    async fn list_reviews_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<Review>>;
    async fn list_reviews_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>>;

    /// Fails with Conflict when the email is already registered
    async fn create_user(&self, user: User) -> AppResult<User>;
    async fn get_user(&self, id: Uuid) -> AppResult<User>;
    async fn get_user_by_email(&self, email: &str) -> AppResult<User>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, description: &str, genres: &[&str], year: i32) -> Movie {
        let mut m = Movie::new(title.to_string(), year);
        m.description = description.to_string();
        m.genre = genres.iter().map(|g| g.to_string()).collect();
        m
    }

    #[test]
    fn test_search_matches_title_or_description_case_insensitive() {
        let m = movie("The Matrix", "A hacker discovers reality", &["Sci-Fi"], 1999);
        assert!(MovieFilter {
            search: Some("matrix".to_string()),
            ..Default::default()
        }
        .matches(&m));
        assert!(MovieFilter {
            search: Some("HACKER".to_string()),
            ..Default::default()
        }
        .matches(&m));
        assert!(!MovieFilter {
            search: Some("western".to_string()),
            ..Default::default()
        }
        .matches(&m));
    }

    #[test]
    fn test_genre_filter_is_exact() {
        let m = movie("Heat", "", &["Action", "Crime"], 1995);
        assert!(MovieFilter {
            genre: Some("Action".to_string()),
            ..Default::default()
        }
        .matches(&m));
        assert!(!MovieFilter {
            genre: Some("action".to_string()),
            ..Default::default()
        }
        .matches(&m));
    }

    #[test]
    fn test_filters_combine_with_and() {
        let m = movie("Heat", "A heist thriller", &["Action"], 1995);
        let filter = MovieFilter {
            search: Some("heist".to_string()),
            genre: Some("Action".to_string()),
            year: Some(1995),
        };
        assert!(filter.matches(&m));

        let wrong_year = MovieFilter {
            year: Some(1996),
            ..filter
        };
        assert!(!wrong_year.matches(&m));
    }

    #[test]
    fn test_update_never_touches_rating_aggregate() {
        let mut m = movie("Heat", "", &["Action"], 1995);
        m.rating = 4.5;
        m.rating_sum = 9;
        m.rating_count = 2;

        let update = MovieUpdate {
            title: Some("Heat (Director's Cut)".to_string()),
            duration: Some(188),
            ..Default::default()
        };
        update.apply_to(&mut m);

        assert_eq!(m.title, "Heat (Director's Cut)");
        assert_eq!(m.duration, 188);
        assert_eq!(m.rating, 4.5);
        assert_eq!(m.rating_sum, 9);
        assert_eq!(m.rating_count, 2);
    }
}
