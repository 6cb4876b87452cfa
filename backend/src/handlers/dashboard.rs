//! HTTP handlers for the dashboard endpoint

use axum::{extract::State, Json};

use shared::types::ApiResponse;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::dashboard::DashboardStats;
use crate::services::DashboardService;
use crate::AppState;

/// Aggregated dashboard figures
pub async fn get_dashboard(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let service = DashboardService::new(state.db);
    let stats = service.get_stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}
