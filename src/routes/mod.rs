pub mod ai;
pub mod auth;
pub mod movies;
pub mod recommendations;
pub mod stream;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{make_span, request_id_middleware};
use crate::state::AppState;

/// Health check endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/profile", get(auth::profile))
        // Catalog
        .route(
            "/api/movies",
            get(movies::list_movies).post(movies::create_movie),
        )
        .route("/api/movies/genres", get(movies::list_genres))
        .route(
            "/api/movies/:id",
            get(movies::get_movie)
                .put(movies::update_movie)
                .delete(movies::delete_movie),
        )
        .route("/api/movies/:id/reviews", post(movies::create_review))
        // Recommendations
        .route("/api/recommendations", get(recommendations::list))
        // AI description
        .route(
            "/api/ai/movies/:id/description",
            post(ai::generate_description),
        )
        // Streaming
        .route("/api/stream/:id/url", get(stream::video_url))
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
