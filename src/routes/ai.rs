use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AdminUser;
use crate::services::description;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DescriptionResponse {
    pub description: String,
}

/// Generates a description for the movie via the external text generator
/// and persists it (admin only)
pub async fn generate_description(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DescriptionResponse>> {
    let description =
        description::generate_description(state.store.as_ref(), state.generator.as_ref(), id)
            .await?;
    Ok(Json(DescriptionResponse { description }))
}
