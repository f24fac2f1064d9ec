use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{AdminUser, AuthUser};
use crate::models::{Movie, Review};
use crate::services::catalog::{self, DEFAULT_PAGE_LIMIT};
use crate::state::AppState;
use crate::store::{MovieFilter, MovieUpdate};

// Request/Response types

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct ListMoviesQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct ListMoviesResponse {
    pub movies: Vec<Movie>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    pub movie: Movie,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    pub title: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<Vec<String>>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovieRequest {
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

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Absent and empty query strings both mean "no filter"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Handlers

/// Lists movies with search, genre and year filters, paginated
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<ListMoviesQuery>,
) -> AppResult<Json<ListMoviesResponse>> {
    let filter = MovieFilter {
        search: non_empty(query.search),
        genre: non_empty(query.genre),
        year: query.year,
    };
    let matching = state.store.list_movies(&filter).await?;
    let page = catalog::paginate(matching, query.page, query.limit);

    Ok(Json(ListMoviesResponse {
        movies: page.movies,
        pagination: Pagination {
            total: page.total,
            page: page.page,
            limit: page.limit,
        },
    }))
}

/// Returns a single movie with its reviews
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MovieDetailResponse>> {
    let movie = state.store.get_movie(id).await?;
    let reviews = state.store.list_reviews_for_movie(id).await?;
    Ok(Json(MovieDetailResponse { movie, reviews }))
}

/// Creates a movie (admin only)
pub async fn create_movie(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Title is required".to_string()))?;
    let year = request
        .year
        .ok_or_else(|| AppError::Validation("Year is required".to_string()))?;

    let mut movie = Movie::new(title, year);
    movie.description = request.description.unwrap_or_default();
    movie.genre = request.genre.unwrap_or_default();
    movie.duration = request.duration.unwrap_or_default();
    movie.poster_url = request.poster_url.unwrap_or_default();
    movie.video_url = request.video_url.unwrap_or_default();
    movie.director = request.director.unwrap_or_default();
    movie.cast = request.cast.unwrap_or_default();

    let movie = state.store.create_movie(movie).await?;
    tracing::info!(movie_id = %movie.id, title = %movie.title, "movie created");
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Updates a movie's fields (admin only); omitted fields are left alone
pub async fn update_movie(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMovieRequest>,
) -> AppResult<Json<Movie>> {
    let update = MovieUpdate {
        title: non_empty(request.title),
        description: non_empty(request.description),
        genre: request.genre,
        year: request.year.filter(|y| *y != 0),
        duration: request.duration.filter(|d| *d != 0),
        poster_url: non_empty(request.poster_url),
        video_url: non_empty(request.video_url),
        director: non_empty(request.director),
        cast: request.cast,
    };
    let movie = state.store.update_movie(id, update).await?;
    Ok(Json(movie))
}

/// Deletes a movie and its reviews (admin only)
pub async fn delete_movie(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    state.store.delete_movie(id).await?;
    tracing::info!(movie_id = %id, "movie deleted");
    Ok(Json(DeleteResponse {
        message: "Movie deleted successfully".to_string(),
    }))
}

/// Records a review for a movie and folds it into the rating aggregate
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(movie_id): Path<Uuid>,
    Json(request): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let rating = request
        .rating
        .filter(|r| Review::rating_in_range(*r))
        .ok_or_else(|| AppError::Validation("Rating must be between 1 and 5".to_string()))?;

    let review = Review::new(
        movie_id,
        user.user_id,
        rating,
        request.comment.unwrap_or_default(),
    );
    let review = state.store.create_review(review).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Returns the distinct genre tags across the catalog
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<GenresResponse>> {
    let movies = state.store.list_movies(&MovieFilter::default()).await?;
    Ok(Json(GenresResponse {
        genres: catalog::distinct_genres(&movies),
    }))
}
