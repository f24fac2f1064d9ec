use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, Review, Role, User};

use super::{MovieFilter, MovieUpdate, RatingAggregate, Store};

const MOVIE_COLUMNS: &str = "id, title, description, genre, year, duration, rating_sum, \
     rating_count, poster_url, video_url, director, cast_members, created_at, updated_at";

/// PostgreSQL-backed store.
///
/// Review creation wraps the aggregate update and the review insert in a
/// single transaction; the row-scoped UPDATE serializes concurrent reviews
/// for the same movie.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects a pool and applies pending migrations.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("migration failed: {e}")))?;

        Ok(Self { pool })
    }
}

fn movie_from_row(row: &PgRow) -> Result<Movie, sqlx::Error> {
    let rating_sum: i64 = row.try_get("rating_sum")?;
    let rating_count: i64 = row.try_get("rating_count")?;
    let aggregate = RatingAggregate {
        sum: rating_sum,
        count: rating_count,
    };
    Ok(Movie {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        genre: row.try_get("genre")?,
        year: row.try_get("year")?,
        duration: row.try_get("duration")?,
        rating: aggregate.average(),
        rating_count,
        rating_sum,
        poster_url: row.try_get("poster_url")?,
        video_url: row.try_get("video_url")?,
        director: row.try_get("director")?,
        cast: row.try_get("cast_members")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn review_from_row(row: &PgRow) -> Result<Review, sqlx::Error> {
    Ok(Review {
        id: row.try_get("id")?,
        movie_id: row.try_get("movie_id")?,
        user_id: row.try_get("user_id")?,
        rating: row.try_get("rating")?,
        comment: row.try_get("comment")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> AppResult<User> {
    let role: String = row.try_get("role").map_err(AppError::Database)?;
    let role = Role::parse(&role)
        .ok_or_else(|| AppError::Internal(format!("unknown role in database: {role}")))?;
    Ok(User {
        id: row.try_get("id").map_err(AppError::Database)?,
        email: row.try_get("email").map_err(AppError::Database)?,
        password_hash: row.try_get("password_hash").map_err(AppError::Database)?,
        first_name: row.try_get("first_name").map_err(AppError::Database)?,
        last_name: row.try_get("last_name").map_err(AppError::Database)?,
        role,
        created_at: row.try_get("created_at").map_err(AppError::Database)?,
    })
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn create_movie(&self, movie: Movie) -> AppResult<Movie> {
        sqlx::query(
            "INSERT INTO movies (id, title, description, genre, year, duration, rating_sum, \
             rating_count, poster_url, video_url, director, cast_members, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(&movie.genre)
        .bind(movie.year)
        .bind(movie.duration)
        .bind(movie.rating_sum)
        .bind(movie.rating_count)
        .bind(&movie.poster_url)
        .bind(&movie.video_url)
        .bind(&movie.director)
        .bind(&movie.cast)
        .bind(movie.created_at)
        .bind(movie.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(movie)
    }

    async fn get_movie(&self, id: Uuid) -> AppResult<Movie> {
        let row = sqlx::query(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;
        Ok(movie_from_row(&row)?)
    }

    async fn update_movie(&self, id: Uuid, update: MovieUpdate) -> AppResult<Movie> {
        let row = sqlx::query(&format!(
            "UPDATE movies SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             genre = COALESCE($4, genre), \
             year = COALESCE($5, year), \
             duration = COALESCE($6, duration), \
             poster_url = COALESCE($7, poster_url), \
             video_url = COALESCE($8, video_url), \
             director = COALESCE($9, director), \
             cast_members = COALESCE($10, cast_members), \
             updated_at = now() \
             WHERE id = $1 RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.genre)
        .bind(update.year)
        .bind(update.duration)
        .bind(update.poster_url)
        .bind(update.video_url)
        .bind(update.director)
        .bind(update.cast)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;
        Ok(movie_from_row(&row)?)
    }

    async fn delete_movie(&self, id: Uuid) -> AppResult<()> {
        // Reviews go with the movie via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Movie not found".to_string()));
        }
        Ok(())
    }

    async fn list_movies(&self, filter: &MovieFilter) -> AppResult<Vec<Movie>> {
        // Mirrors MovieFilter::matches
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE TRUE"));
        if let Some(term) = &filter.search {
            let pattern = format!("%{term}%");
            query.push(" AND (title ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR description ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }
        if let Some(genre) = &filter.genre {
            query.push(" AND ");
            query.push_bind(genre.clone());
            query.push(" = ANY(genre)");
        }
        if let Some(year) = filter.year {
            query.push(" AND year = ");
            query.push_bind(year);
        }

        let rows = query.build().fetch_all(&self.pool).await?;
        let mut movies = Vec::with_capacity(rows.len());
        for row in &rows {
            movies.push(movie_from_row(row)?);
        }
        Ok(movies)
    }

    async fn create_review(&self, review: Review) -> AppResult<Review> {
        let mut tx = self.pool.begin().await?;

        // Row-scoped read-modify-write; zero rows means the movie is gone
        // and nothing has been written yet.
        let updated = sqlx::query(
            "UPDATE movies SET rating_sum = rating_sum + $2, rating_count = rating_count + 1 \
             WHERE id = $1",
        )
        .bind(review.movie_id)
        .bind(i64::from(review.rating))
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Movie not found".to_string()));
        }

        sqlx::query(
            "INSERT INTO reviews (id, movie_id, user_id, rating, comment, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(review.id)
        .bind(review.movie_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(review)
    }

    async fn list_reviews_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<Review>> {
        let rows = sqlx::query(
            "SELECT id, movie_id, user_id, rating, comment, created_at, updated_at \
             FROM reviews WHERE movie_id = $1 ORDER BY created_at, id",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        let mut reviews = Vec::with_capacity(rows.len());
        for row in &rows {
            reviews.push(review_from_row(row)?);
        }
        Ok(reviews)
    }

    async fn list_reviews_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let rows = sqlx::query(
            "SELECT id, movie_id, user_id, rating, comment, created_at, updated_at \
             FROM reviews WHERE user_id = $1 ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        let mut reviews = Vec::with_capacity(rows.len());
        for row in &rows {
            reviews.push(review_from_row(row)?);
        }
        Ok(reviews)
    }

    async fn create_user(&self, user: User) -> AppResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::Conflict("Email already registered".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, first_name, last_name, role, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user_from_row(&row)
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, first_name, last_name, role, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user_from_row(&row)
    }
}
