use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{Role, User};
use crate::services::auth;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registers a new account and signs it in
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&request.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = auth::hash_password(&request.password)?;
    let user = state
        .store
        .create_user(User::new(
            email,
            password_hash,
            request.first_name,
            request.last_name,
            Role::User,
        ))
        .await?;

    let token = state.tokens.issue(&user)?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// Exchanges email and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // A single error message for both unknown email and bad password, so
    // the endpoint cannot be used to probe for registered addresses.
    let invalid = || AppError::Authentication("Invalid email or password".to_string());

    let user = state
        .store
        .get_user_by_email(&normalize_email(&request.email))
        .await
        .map_err(|err| match err {
            AppError::NotFound(_) => invalid(),
            other => other,
        })?;

    if !auth::verify_password(&request.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = state.tokens.issue(&user)?;
    Ok(Json(AuthResponse { token, user }))
}

/// Returns the calling user's profile
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = state.store.get_user(user.user_id).await?;
    Ok(Json(ProfileResponse { user }))
}
