use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::Movie;
use crate::services::recommendations::recommend;
use crate::state::AppState;
use crate::store::MovieFilter;

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Movie>,
}

/// Ranks unseen movies for the calling user.
///
/// Recomputed from the live review history and catalog snapshot on every
/// call, so a new review shows up in the very next response.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<RecommendationsResponse>> {
    let reviews = state.store.list_reviews_for_user(user.user_id).await?;
    let catalog = state.store.list_movies(&MovieFilter::default()).await?;
    let recommendations = recommend(&reviews, &catalog);

    tracing::debug!(
        user_id = %user.user_id,
        reviews = reviews.len(),
        recommended = recommendations.len(),
        "recommendations computed"
    );
    Ok(Json(RecommendationsResponse { recommendations }))
}
