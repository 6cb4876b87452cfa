//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};

use shared::models::User;
use shared::types::ApiResponse;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthData, LoginInput, RegisterInput};
use crate::services::AuthService;
use crate::AppState;

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthData>>)> {
    let service = AuthService::new(state.db, &state.config);
    let data = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data))))
}

/// Authenticate with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<ApiResponse<AuthData>>> {
    let service = AuthService::new(state.db, &state.config);
    let data = service.login(input).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Current user's profile
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let service = AuthService::new(state.db, &state.config);
    let user = service.me(current_user.0.user_id).await?;
    Ok(Json(ApiResponse::ok(user)))
}
