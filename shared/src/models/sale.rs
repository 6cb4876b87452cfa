//! Sales: header, line items, status lifecycle and total computation
//!
//! The status machine and its stock effects are the heart of the system:
//! a sale holds reserved stock exactly while its status is CONFIRMED or
//! DELIVERED. Transitions into/out of that holding set commit or release
//! stock, and every such movement lands in the stock ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sale status lifecycle:
/// PENDING → CONFIRMED → DELIVERED (terminal), CANCELLED (terminal,
/// reachable from PENDING and CONFIRMED). DELIVERED and CANCELLED never
/// transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SaleStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

/// What a status transition does to the parts' stock counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// No stock movement
    None,
    /// Validate availability, decrement stock, append OUT movements
    Commit,
    /// Increment stock, append IN movements
    Release,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "PENDING",
            SaleStatus::Confirmed => "CONFIRMED",
            SaleStatus::Delivered => "DELIVERED",
            SaleStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether a sale in this status holds reserved stock.
    pub fn holds_stock(&self) -> bool {
        matches!(self, SaleStatus::Confirmed | SaleStatus::Delivered)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SaleStatus::Delivered | SaleStatus::Cancelled)
    }

    /// Legal status transitions. A same-status "transition" is a header-only
    /// update and always allowed (for non-DELIVERED sales).
    pub fn can_transition_to(&self, next: SaleStatus) -> bool {
        use SaleStatus::*;
        if *self == next {
            return !matches!(self, Delivered);
        }
        matches!(
            (*self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Pending)
                | (Confirmed, Delivered)
                | (Confirmed, Cancelled)
        )
    }

    /// Stock effect of a legal transition, derived from the holding set.
    pub fn stock_effect(&self, next: SaleStatus) -> StockEffect {
        match (self.holds_stock(), next.holds_stock()) {
            (false, true) => StockEffect::Commit,
            (true, false) => StockEffect::Release,
            _ => StockEffect::None,
        }
    }
}

/// Payment methods accepted at the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
    BankTransfer,
    Check,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::DebitCard => "DEBIT_CARD",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Check => "CHECK",
        }
    }
}

/// Sale header. `total` is derived from the items minus the header
/// discount and stored denormalized for listing/aggregation queries.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub sale_number: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_document: Option<String>,
    pub status: SaleStatus,
    pub payment_method: Option<PaymentMethod>,
    pub discount: Option<Decimal>,
    pub total: Decimal,
    pub notes: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sale line item. Price is a snapshot of the part's unit price at sale
/// time; items are immutable once the sale is created.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub part_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Line total: quantity × unit price − item discount.
pub fn line_total(quantity: i32, price: Decimal, discount: Option<Decimal>) -> Decimal {
    Decimal::from(quantity) * price - discount.unwrap_or(Decimal::ZERO)
}

/// Grand total: sum of line totals minus the header discount.
pub fn sale_total(line_totals: &[Decimal], discount: Option<Decimal>) -> Decimal {
    line_totals.iter().copied().sum::<Decimal>() - discount.unwrap_or(Decimal::ZERO)
}
