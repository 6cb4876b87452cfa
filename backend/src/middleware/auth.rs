//! Authentication middleware
//!
//! Bearer-token authentication and role gating. The JWT secret comes from
//! the application state (no process-wide fallbacks); the token carries the
//! user id and the role that was resolved when it was issued.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use shared::models::Role;

use crate::error::{AppError, ErrorBody};
use crate::services::auth::decode_token;
use crate::AppState;

/// Authenticated user information extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Middleware that validates the Authorization header and stores the
/// authenticated user in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let claims = match decode_token(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(err) => return unauthorized_response(&err.to_string()),
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid user id in token"),
    };

    let role = match Role::from_str(&claims.role) {
        Some(role) => role,
        None => return unauthorized_response("Invalid role in token"),
    };

    request.extensions_mut().insert(AuthUser { user_id, role });

    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        success: false,
        error: format!("Unauthorized: {}", message),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Extractor for the authenticated user; use in handlers behind
/// `auth_middleware`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let body = ErrorBody {
                    success: false,
                    error: "Unauthorized: authentication required".to_string(),
                };
                (StatusCode::UNAUTHORIZED, Json(body))
            })
    }
}

/// Gate for destructive endpoints: only administrators may pass.
pub fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.role.can_delete_records() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only administrators can perform this action".to_string(),
        ))
    }
}
