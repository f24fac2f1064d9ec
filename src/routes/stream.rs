use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUrlResponse {
    pub video_url: String,
}

/// Resolves the playback URL for a movie.
///
/// A movie without a video reference has no watch link, so it reports
/// NotFound here even though the movie itself exists.
pub async fn video_url(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<VideoUrlResponse>> {
    let movie = state.store.get_movie(id).await?;
    if movie.video_url.is_empty() {
        return Err(AppError::NotFound("Video not available".to_string()));
    }
    Ok(Json(VideoUrlResponse {
        video_url: format!("/api/stream/{id}"),
    }))
}
