//! User registration and status endpoints

use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::error::{ApiError, Result};
use crate::models::{UserRegisterRequest, UserRegisterResponse, UserStatusResponse};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// POST /api/users/register
/// Creates a new user and returns its bearer token
pub async fn register(
    State(state): State<AppState>,
    payload: Option<Json<UserRegisterRequest>>,
) -> Result<(StatusCode, Json<UserRegisterResponse>)> {
    let name = payload.and_then(|Json(p)| p.name);
    let user = state.store.create_user(name.as_deref()).await?;

    tracing::info!("Registered new user: {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(UserRegisterResponse {
            user_id: user.id,
            token: user.token,
        }),
    ))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<UserStatusResponse>> {
    let user = state
        .store
        .get_user_by_token(&auth.token)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserStatusResponse {
        user_id: user.id,
        name: user.name,
        last_seen_at: user.last_seen_at,
    }))
}
