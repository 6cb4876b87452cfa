//! HTTP handlers for parts catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::types::{ApiResponse, Paginated, PaginationQuery};

use crate::error::AppResult;
use crate::middleware::{require_admin, CurrentUser};
use crate::services::part::{
    CreatePartInput, PartDeleteOutcome, PartDetail, PartFilters, PartWithNames, UpdatePartInput,
};
use crate::services::PartService;
use crate::AppState;

/// List parts with filters and pagination
pub async fn list_parts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filters): Query<PartFilters>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<Paginated<PartWithNames>>> {
    let pagination = pagination.normalized();
    let service = PartService::new(state.db);
    let (parts, total) = service
        .list_parts(&filters, i64::from(pagination.limit), pagination.offset())
        .await?;
    Ok(Json(Paginated::new(parts, pagination, total)))
}

/// Create a part
pub async fn create_part(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreatePartInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<PartWithNames>>)> {
    let service = PartService::new(state.db);
    let part = service.create_part(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(part))))
}

/// Get a part with its recent stock movements
pub async fn get_part(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(part_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PartDetail>>> {
    let service = PartService::new(state.db);
    let part = service.get_part(part_id).await?;
    Ok(Json(ApiResponse::ok(part)))
}

/// Update a part
pub async fn update_part(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(part_id): Path<Uuid>,
    Json(input): Json<UpdatePartInput>,
) -> AppResult<Json<ApiResponse<PartWithNames>>> {
    let service = PartService::new(state.db);
    let part = service.update_part(part_id, input).await?;
    Ok(Json(ApiResponse::ok(part)))
}

/// Delete or deactivate a part (administrators only)
pub async fn delete_part(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(part_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PartDeleteOutcome>>> {
    require_admin(&current_user.0)?;

    let service = PartService::new(state.db);
    let outcome = service.delete_part(part_id).await?;

    let message = if outcome.deactivated {
        "Part deactivated (has associated sales)"
    } else {
        "Part deleted successfully"
    };
    Ok(Json(ApiResponse::with_message(outcome, message)))
}
