//! Dashboard aggregation service (read-only)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::SaleStatus;

use crate::error::AppResult;

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// Aggregated figures for the dashboard page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_parts: i64,
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub low_stock_parts: i64,
    pub recent_sales: Vec<RecentSale>,
    pub top_selling_parts: Vec<TopSellingPart>,
    pub sales_by_month: Vec<MonthlySales>,
}

/// Compact sale row for the "recent sales" panel
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentSale {
    pub id: Uuid,
    pub sale_number: String,
    pub customer_name: Option<String>,
    pub status: SaleStatus,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Best-selling part by summed quantity
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingPart {
    pub part_id: Uuid,
    pub code: String,
    pub name: String,
    pub total_sold: i64,
    pub revenue: Decimal,
}

/// Sales count and revenue for one calendar month
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    pub month: String,
    pub sales: i64,
    pub revenue: Decimal,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Collect all dashboard figures. Reads run unsynchronized with
    /// concurrent writers; slightly stale numbers are acceptable here.
    pub async fn get_stats(&self) -> AppResult<DashboardStats> {
        let total_parts =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parts WHERE is_active")
                .fetch_one(&self.db)
                .await?;

        let total_sales = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.db)
            .await?;

        let total_revenue =
            sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(total), 0) FROM sales")
                .fetch_one(&self.db)
                .await?;

        let low_stock_parts = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM parts WHERE is_active AND stock <= min_stock",
        )
        .fetch_one(&self.db)
        .await?;

        let recent_sales = sqlx::query_as::<_, RecentSale>(
            r#"
            SELECT id, sale_number, customer_name, status, total, created_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let top_selling_parts = sqlx::query_as::<_, TopSellingPart>(
            r#"
            SELECT si.part_id, p.code, p.name,
                   SUM(si.quantity) AS total_sold,
                   COALESCE(SUM(si.total), 0) AS revenue
            FROM sale_items si
            JOIN parts p ON p.id = si.part_id
            GROUP BY si.part_id, p.code, p.name
            ORDER BY total_sold DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let sales_by_month = sqlx::query_as::<_, MonthlySales>(
            r#"
            SELECT to_char(date_trunc('month', created_at), 'YYYY-MM') AS month,
                   COUNT(*) AS sales,
                   COALESCE(SUM(total), 0) AS revenue
            FROM sales
            WHERE created_at >= date_trunc('month', NOW()) - INTERVAL '5 months'
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(DashboardStats {
            total_parts,
            total_sales,
            total_revenue,
            low_stock_parts,
            recent_sales,
            top_selling_parts,
            sales_by_month,
        })
    }
}
