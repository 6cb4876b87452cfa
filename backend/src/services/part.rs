//! Parts catalog service
//!
//! CRUD over the parts table. Stock is part of the catalog record but its
//! mutations always go through the ledger: creation seeds an "Estoque
//! inicial" entry and manual edits append the delta as an adjustment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{MovementType, Part, StockMovement};
use shared::validation::is_valid_part_code;

use crate::error::{AppError, AppResult};
use crate::services::stock;

/// Ledger reason for the opening stock of a new part
const REASON_INITIAL_STOCK: &str = "Estoque inicial";

/// Ledger reason for a manual stock edit on the part form
const REASON_MANUAL_ADJUSTMENT: &str = "Ajuste manual de estoque";

/// How many ledger entries the part detail view shows
const RECENT_MOVEMENTS: i64 = 10;

/// Parts catalog service
#[derive(Clone)]
pub struct PartService {
    db: PgPool,
}

/// Input for creating a part
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePartInput {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub min_stock: i32,
    pub location: Option<String>,
    pub category_id: Uuid,
    pub supplier_id: Option<Uuid>,
}

/// Input for updating a part; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct UpdatePartInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub stock: Option<i32>,
    pub min_stock: Option<i32>,
    pub location: Option<String>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Listing filters
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartFilters {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub low_stock: bool,
    pub inactive: bool,
}

/// Part enriched with its category and supplier names
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PartWithNames {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub part: Part,
    pub category_name: String,
    pub supplier_name: Option<String>,
}

/// Part detail view with its most recent ledger entries
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDetail {
    #[serde(flatten)]
    pub part: PartWithNames,
    pub stock_movements: Vec<StockMovement>,
}

/// Result of a part deletion request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDeleteOutcome {
    pub deactivated: bool,
}

/// Delta between the stored stock and a manually requested one, as a
/// ledger movement. `None` when nothing changed.
fn manual_adjustment(current: i32, requested: i32) -> Option<(MovementType, i32)> {
    match requested - current {
        0 => None,
        diff if diff > 0 => Some((MovementType::In, diff)),
        diff => Some((MovementType::Out, -diff)),
    }
}

const PART_COLUMNS: &str = "p.id, p.code, p.name, p.description, p.brand, p.model, p.year, \
     p.price, p.cost_price, p.stock, p.min_stock, p.location, p.category_id, p.supplier_id, \
     p.is_active, p.created_at, p.updated_at";

const PART_FILTER_WHERE: &str = "\
     ($1::text IS NULL OR p.name ILIKE '%' || $1 || '%' \
        OR p.code ILIKE '%' || $1 || '%' \
        OR p.brand ILIKE '%' || $1 || '%' \
        OR p.model ILIKE '%' || $1 || '%') \
     AND ($2::uuid IS NULL OR p.category_id = $2) \
     AND ($3::uuid IS NULL OR p.supplier_id = $3) \
     AND (NOT $4 OR p.stock <= p.min_stock) \
     AND ($5 OR p.is_active)";

impl PartService {
    /// Create a new PartService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List parts newest-first with filters and pagination.
    pub async fn list_parts(
        &self,
        filters: &PartFilters,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<PartWithNames>, u64)> {
        let search = filters
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM parts p WHERE {PART_FILTER_WHERE}"
        ))
        .bind(search)
        .bind(filters.category_id)
        .bind(filters.supplier_id)
        .bind(filters.low_stock)
        .bind(filters.inactive)
        .fetch_one(&self.db)
        .await?;

        let parts = sqlx::query_as::<_, PartWithNames>(&format!(
            r#"
            SELECT {PART_COLUMNS}, c.name AS category_name, s.name AS supplier_name
            FROM parts p
            JOIN categories c ON c.id = p.category_id
            LEFT JOIN suppliers s ON s.id = p.supplier_id
            WHERE {PART_FILTER_WHERE}
            ORDER BY p.created_at DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(search)
        .bind(filters.category_id)
        .bind(filters.supplier_id)
        .bind(filters.low_stock)
        .bind(filters.inactive)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok((parts, total as u64))
    }

    /// Load a part with its category/supplier names and recent ledger
    /// entries.
    pub async fn get_part(&self, part_id: Uuid) -> AppResult<PartDetail> {
        let part = sqlx::query_as::<_, PartWithNames>(&format!(
            r#"
            SELECT {PART_COLUMNS}, c.name AS category_name, s.name AS supplier_name
            FROM parts p
            JOIN categories c ON c.id = p.category_id
            LEFT JOIN suppliers s ON s.id = p.supplier_id
            WHERE p.id = $1
            "#
        ))
        .bind(part_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Part".to_string()))?;

        let stock_movements = stock::recent_movements(&self.db, part_id, RECENT_MOVEMENTS).await?;

        Ok(PartDetail {
            part,
            stock_movements,
        })
    }

    /// Create a part. An opening stock greater than zero is recorded in
    /// the ledger as "Estoque inicial".
    pub async fn create_part(&self, input: CreatePartInput) -> AppResult<PartWithNames> {
        if !is_valid_part_code(&input.code) {
            return Err(AppError::Validation(
                "Part code must be 3-20 uppercase letters, digits or dashes".to_string(),
            ));
        }
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if input.price < Decimal::ZERO {
            return Err(AppError::Validation(
                "Price cannot be negative".to_string(),
            ));
        }
        if input.cost_price.is_some_and(|c| c < Decimal::ZERO) {
            return Err(AppError::Validation(
                "Cost price cannot be negative".to_string(),
            ));
        }
        if input.stock < 0 || input.min_stock < 0 {
            return Err(AppError::Validation(
                "Stock levels cannot be negative".to_string(),
            ));
        }

        let code_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM parts WHERE code = $1)")
                .bind(&input.code)
                .fetch_one(&self.db)
                .await?;
        if code_taken {
            return Err(AppError::Conflict("Part code already exists".to_string()));
        }

        let category_name =
            sqlx::query_scalar::<_, String>("SELECT name FROM categories WHERE id = $1")
                .bind(input.category_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        let supplier_name = match input.supplier_id {
            Some(supplier_id) => Some(
                sqlx::query_scalar::<_, String>("SELECT name FROM suppliers WHERE id = $1")
                    .bind(supplier_id)
                    .fetch_optional(&self.db)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?,
            ),
            None => None,
        };

        let mut tx = self.db.begin().await?;

        let part = sqlx::query_as::<_, Part>(
            r#"
            INSERT INTO parts (code, name, description, brand, model, year, price, cost_price,
                               stock, min_stock, location, category_id, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, code, name, description, brand, model, year, price, cost_price,
                      stock, min_stock, location, category_id, supplier_id, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(&input.code)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.brand)
        .bind(&input.model)
        .bind(&input.year)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(&input.location)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .fetch_one(&mut *tx)
        .await?;

        if input.stock > 0 {
            stock::record_movement(
                &mut tx,
                part.id,
                MovementType::In,
                input.stock,
                REASON_INITIAL_STOCK,
                None,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(code = %part.code, "part created");

        Ok(PartWithNames {
            part,
            category_name,
            supplier_name,
        })
    }

    /// Update a part. A manual stock edit appends the delta to the ledger
    /// as "Ajuste manual de estoque".
    pub async fn update_part(
        &self,
        part_id: Uuid,
        input: UpdatePartInput,
    ) -> AppResult<PartWithNames> {
        if let Some(code) = &input.code {
            if !is_valid_part_code(code) {
                return Err(AppError::Validation(
                    "Part code must be 3-20 uppercase letters, digits or dashes".to_string(),
                ));
            }
        }
        if input.price.is_some_and(|p| p < Decimal::ZERO)
            || input.cost_price.is_some_and(|c| c < Decimal::ZERO)
        {
            return Err(AppError::Validation(
                "Prices cannot be negative".to_string(),
            ));
        }
        if input.stock.is_some_and(|s| s < 0) || input.min_stock.is_some_and(|s| s < 0) {
            return Err(AppError::Validation(
                "Stock levels cannot be negative".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, Part>(
            r#"
            SELECT id, code, name, description, brand, model, year, price, cost_price,
                   stock, min_stock, location, category_id, supplier_id, is_active,
                   created_at, updated_at
            FROM parts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(part_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Part".to_string()))?;

        if let Some(code) = &input.code {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM parts WHERE code = $1 AND id <> $2)",
            )
            .bind(code)
            .bind(part_id)
            .fetch_one(&mut *tx)
            .await?;
            if taken {
                return Err(AppError::Conflict("Part code already exists".to_string()));
            }
        }

        let category_id = input.category_id.unwrap_or(current.category_id);
        let category_name =
            sqlx::query_scalar::<_, String>("SELECT name FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        let supplier_id = input.supplier_id.or(current.supplier_id);
        let supplier_name = match supplier_id {
            Some(id) => Some(
                sqlx::query_scalar::<_, String>("SELECT name FROM suppliers WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?,
            ),
            None => None,
        };

        let new_stock = input.stock.unwrap_or(current.stock);
        if let Some((movement_type, quantity)) = manual_adjustment(current.stock, new_stock) {
            stock::record_movement(
                &mut tx,
                part_id,
                movement_type,
                quantity,
                REASON_MANUAL_ADJUSTMENT,
                None,
            )
            .await?;
        }

        let part = sqlx::query_as::<_, Part>(
            r#"
            UPDATE parts
            SET code = $2, name = $3, description = $4, brand = $5, model = $6, year = $7,
                price = $8, cost_price = $9, stock = $10, min_stock = $11, location = $12,
                category_id = $13, supplier_id = $14, is_active = $15, updated_at = NOW()
            WHERE id = $1
            RETURNING id, code, name, description, brand, model, year, price, cost_price,
                      stock, min_stock, location, category_id, supplier_id, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(part_id)
        .bind(input.code.unwrap_or(current.code))
        .bind(input.name.unwrap_or(current.name))
        .bind(input.description.or(current.description))
        .bind(input.brand.or(current.brand))
        .bind(input.model.or(current.model))
        .bind(input.year.or(current.year))
        .bind(input.price.unwrap_or(current.price))
        .bind(input.cost_price.or(current.cost_price))
        .bind(new_stock)
        .bind(input.min_stock.unwrap_or(current.min_stock))
        .bind(input.location.or(current.location))
        .bind(category_id)
        .bind(supplier_id)
        .bind(input.is_active.unwrap_or(current.is_active))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PartWithNames {
            part,
            category_name,
            supplier_name,
        })
    }

    /// Delete a part, or deactivate it when sale items still reference it
    /// (the sales history must keep resolving).
    pub async fn delete_part(&self, part_id: Uuid) -> AppResult<PartDeleteOutcome> {
        let sales_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sale_items WHERE part_id = $1")
                .bind(part_id)
                .fetch_one(&self.db)
                .await?;

        if sales_count > 0 {
            let result =
                sqlx::query("UPDATE parts SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                    .bind(part_id)
                    .execute(&self.db)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::NotFound("Part".to_string()));
            }
            tracing::info!(%part_id, "part deactivated (has associated sales)");
            return Ok(PartDeleteOutcome { deactivated: true });
        }

        let result = sqlx::query("DELETE FROM parts WHERE id = $1")
            .bind(part_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Part".to_string()));
        }

        tracing::info!(%part_id, "part deleted");
        Ok(PartDeleteOutcome { deactivated: false })
    }
}
