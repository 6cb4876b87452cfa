//! Auto parts catalog entries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A part in the catalog. `stock` is the current quantity on hand and is
/// only mutated through the sale lifecycle or an explicit manual
/// adjustment, both of which append a matching stock movement.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub stock: i32,
    pub min_stock: i32,
    pub location: Option<String>,
    pub category_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    /// A part is running low when stock is at or below its minimum level.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}
