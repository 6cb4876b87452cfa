//! HTTP handlers for sale endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::types::{ApiResponse, Paginated, PaginationQuery};

use crate::error::AppResult;
use crate::middleware::{require_admin, CurrentUser};
use crate::services::sale::{
    CreateSaleInput, DeleteSaleOutcome, SaleFilters, SaleWithItems, UpdateSaleInput,
};
use crate::services::SaleService;
use crate::AppState;

fn sale_service(state: AppState) -> SaleService {
    SaleService::new(state.db, state.sale_numbers)
}

/// List sales with filters and pagination
pub async fn list_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filters): Query<SaleFilters>,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<Json<Paginated<SaleWithItems>>> {
    let pagination = pagination.normalized();
    let service = sale_service(state);
    let (sales, total) = service
        .list_sales(&filters, i64::from(pagination.limit), pagination.offset())
        .await?;
    Ok(Json(Paginated::new(sales, pagination, total)))
}

/// Create a sale
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<SaleWithItems>>)> {
    let service = sale_service(state);
    let sale = service.create_sale(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(sale))))
}

/// Get a single sale with its items
pub async fn get_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SaleWithItems>>> {
    let service = sale_service(state);
    let sale = service.get_sale(sale_id).await?;
    Ok(Json(ApiResponse::ok(sale)))
}

/// Update a sale's header fields and/or status
pub async fn update_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<UpdateSaleInput>,
) -> AppResult<Json<ApiResponse<SaleWithItems>>> {
    let service = sale_service(state);
    let sale = service.update_sale(sale_id, input).await?;
    Ok(Json(ApiResponse::ok(sale)))
}

/// Delete a sale (administrators only)
pub async fn delete_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeleteSaleOutcome>>> {
    require_admin(&current_user.0)?;

    let service = sale_service(state);
    let outcome = service.delete_sale(sale_id).await?;

    let message = if outcome.stock_returned {
        "Sale deleted and stock restored"
    } else {
        "Sale deleted successfully"
    };
    Ok(Json(ApiResponse::with_message(outcome, message)))
}
