use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, Review, User};

use super::{MovieFilter, MovieUpdate, RatingAggregate, Store};

/// In-memory store backed by a single `RwLock`.
///
/// Backs tests and database-less deployments. Review creation runs its
/// movie-exists check, the insert and the aggregate update inside one write
/// lock, which gives the same atomicity as the SQL transaction in the
/// Postgres store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    movies: HashMap<Uuid, Movie>,
    reviews: HashMap<Uuid, Review>,
    users: HashMap<Uuid, User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn create_movie(&self, movie: Movie) -> AppResult<Movie> {
        let mut inner = self.inner.write().await;
        inner.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn get_movie(&self, id: Uuid) -> AppResult<Movie> {
        let inner = self.inner.read().await;
        inner
            .movies
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))
    }

    async fn update_movie(&self, id: Uuid, update: MovieUpdate) -> AppResult<Movie> {
        let mut inner = self.inner.write().await;
        let movie = inner
            .movies
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;
        update.apply_to(movie);
        Ok(movie.clone())
    }

    async fn delete_movie(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.movies.remove(&id).is_none() {
            return Err(AppError::NotFound("Movie not found".to_string()));
        }
        inner.reviews.retain(|_, review| review.movie_id != id);
        Ok(())
    }

    async fn list_movies(&self, filter: &MovieFilter) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner
            .movies
            .values()
            .filter(|movie| filter.matches(movie))
            .cloned()
            .collect())
    }

    async fn create_review(&self, review: Review) -> AppResult<Review> {
        let mut inner = self.inner.write().await;
        // NotFound before anything is written; the write lock makes the
        // aggregate update and the insert one atomic unit
        let movie = inner
            .movies
            .get_mut(&review.movie_id)
            .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;
        let mut aggregate = RatingAggregate::from_movie(movie);
        aggregate.add(review.rating);
        aggregate.apply_to(movie);
        inner.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn list_reviews_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<Review>> {
        let inner = self.inner.read().await;
        let mut reviews: Vec<Review> = inner
            .reviews
            .values()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(reviews)
    }

    async fn list_reviews_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let inner = self.inner.read().await;
        let mut reviews: Vec<Review> = inner
            .reviews
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(reviews)
    }

    async fn create_user(&self, user: User) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_movie(title: &str) -> Movie {
        Movie::new(title.to_string(), 2020)
    }

    #[tokio::test]
    async fn test_movie_crud_round_trip() {
        let store = MemoryStore::new();
        let movie = store.create_movie(sample_movie("Heat")).await.unwrap();

        let fetched = store.get_movie(movie.id).await.unwrap();
        assert_eq!(fetched, movie);

        let updated = store
            .update_movie(
                movie.id,
                MovieUpdate {
                    director: Some("Michael Mann".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.director, "Michael Mann");

        store.delete_movie(movie.id).await.unwrap();
        assert!(matches!(
            store.get_movie(movie.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_movie_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_movie(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_review_updates_aggregate_atomically() {
        let store = MemoryStore::new();
        let movie = store.create_movie(sample_movie("Heat")).await.unwrap();
        let user = Uuid::new_v4();

        store
            .create_review(Review::new(movie.id, user, 5, String::new()))
            .await
            .unwrap();
        store
            .create_review(Review::new(movie.id, user, 2, String::new()))
            .await
            .unwrap();

        let fetched = store.get_movie(movie.id).await.unwrap();
        assert_eq!(fetched.rating_count, 2);
        assert_eq!(fetched.rating, 3.5);
    }

    #[tokio::test]
    async fn test_review_for_missing_movie_leaves_no_trace() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let result = store
            .create_review(Review::new(Uuid::new_v4(), user, 4, String::new()))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(store.list_reviews_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_reviews_never_lose_an_update() {
        let store = MemoryStore::new();
        let movie = store.create_movie(sample_movie("Heat")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            let movie_id = movie.id;
            handles.push(tokio::spawn(async move {
                let rating = (i % 5) + 1;
                store
                    .create_review(Review::new(movie_id, Uuid::new_v4(), rating, String::new()))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let fetched = store.get_movie(movie.id).await.unwrap();
        let reviews = store.list_reviews_for_movie(movie.id).await.unwrap();
        assert_eq!(fetched.rating_count, 50);
        assert_eq!(reviews.len(), 50);
        let expected: f64 =
            reviews.iter().map(|r| f64::from(r.rating)).sum::<f64>() / reviews.len() as f64;
        assert!((fetched.rating - expected).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_deleting_movie_drops_its_reviews() {
        let store = MemoryStore::new();
        let movie = store.create_movie(sample_movie("Heat")).await.unwrap();
        let user = Uuid::new_v4();
        store
            .create_review(Review::new(movie.id, user, 4, String::new()))
            .await
            .unwrap();

        store.delete_movie(movie.id).await.unwrap();
        assert!(store.list_reviews_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let user = User::new(
            "ada@example.com".to_string(),
            "hash".to_string(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            Role::User,
        );
        store.create_user(user.clone()).await.unwrap();

        let duplicate = User::new(
            "ada@example.com".to_string(),
            "other-hash".to_string(),
            "Ada".to_string(),
            "L".to_string(),
            Role::User,
        );
        assert!(matches!(
            store.create_user(duplicate).await,
            Err(AppError::Conflict(_))
        ));

        let fetched = store.get_user_by_email("ada@example.com").await.unwrap();
        assert_eq!(fetched.id, user.id);
    }
}
