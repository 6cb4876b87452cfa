//! Part stock store and stock movement ledger
//!
//! The stock counter is only ever mutated through these helpers, inside a
//! caller-owned transaction, with the part row locked `FOR UPDATE` so that
//! concurrent sales against the same part serialize at the database. Every
//! mutation is paired with an append-only ledger entry by the callers.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared::models::{MovementType, StockMovement};

use crate::error::{AppError, AppResult};

/// A part row locked for the duration of the current transaction.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LockedPart {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub stock: i32,
}

/// Lock a part row (`SELECT ... FOR UPDATE`) and return its current state.
pub async fn lock_part(conn: &mut PgConnection, part_id: Uuid) -> AppResult<LockedPart> {
    sqlx::query_as::<_, LockedPart>(
        "SELECT id, code, name, stock FROM parts WHERE id = $1 FOR UPDATE",
    )
    .bind(part_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Part {}", part_id)))
}

/// Decrement a locked part's stock. Rejects with `InsufficientStock` when
/// the quantity on hand is lower than requested; the `stock >= quantity`
/// guard re-checks under the lock and the table's CHECK constraint
/// backstops it.
pub async fn take_stock(
    conn: &mut PgConnection,
    part: &LockedPart,
    quantity: i32,
) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE parts SET stock = stock - $2, updated_at = NOW() WHERE id = $1 AND stock >= $2",
    )
    .bind(part.id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::InsufficientStock {
            part: part.name.clone(),
        });
    }

    Ok(())
}

/// Increment a locked part's stock.
pub async fn return_stock(
    conn: &mut PgConnection,
    part: &LockedPart,
    quantity: i32,
) -> AppResult<()> {
    sqlx::query("UPDATE parts SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
        .bind(part.id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Append a ledger entry. Entries are never updated or deleted afterwards.
pub async fn record_movement(
    conn: &mut PgConnection,
    part_id: Uuid,
    movement_type: MovementType,
    quantity: i32,
    reason: &str,
    reference: Option<&str>,
) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::Validation(
            "Movement quantity must be positive".to_string(),
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO stock_movements (part_id, movement_type, quantity, reason, reference)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(part_id)
    .bind(movement_type)
    .bind(quantity)
    .bind(reason)
    .bind(reference)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Most recent ledger entries for a part, newest first.
pub async fn recent_movements(
    pool: &PgPool,
    part_id: Uuid,
    limit: i64,
) -> AppResult<Vec<StockMovement>> {
    let movements = sqlx::query_as::<_, StockMovement>(
        r#"
        SELECT id, part_id, movement_type, quantity, reason, reference, created_at
        FROM stock_movements
        WHERE part_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(part_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(movements)
}
