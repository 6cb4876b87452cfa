//! HTTP handlers for category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::models::Category;
use shared::types::ApiResponse;

use crate::error::AppResult;
use crate::middleware::{require_admin, CurrentUser};
use crate::services::category::{CategoryWithCount, CreateCategoryInput, UpdateCategoryInput};
use crate::services::CategoryService;
use crate::AppState;

/// List all categories with part counts
pub async fn list_categories(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<CategoryWithCount>>>> {
    let service = CategoryService::new(state.db);
    let categories = service.list_categories().await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let service = CategoryService::new(state.db);
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(category))))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let service = CategoryService::new(state.db);
    let category = service.update_category(category_id, input).await?;
    Ok(Json(ApiResponse::ok(category)))
}

/// Delete a category (administrators only)
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    require_admin(&current_user.0)?;

    let service = CategoryService::new(state.db);
    service.delete_category(category_id).await?;
    Ok(Json(ApiResponse::message("Category deleted successfully")))
}
