//! Sale lifecycle service
//!
//! Orchestrates validation, stock mutation and ledger writes across sale
//! creation, header/status updates and deletion. Each operation runs in a
//! single transaction with the affected part rows locked, so a failure
//! partway through leaves nothing applied.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{
    line_total, sale_total, MovementType, PaymentMethod, Sale, SaleItem, SaleStatus, StockEffect,
};

use crate::error::{AppError, AppResult};
use crate::services::stock;

/// Ledger reason for stock leaving on a sale
const REASON_SALE: &str = "Venda";

fn release_reason(sale_number: &str) -> String {
    format!("Estorno da venda #{}", sale_number)
}

fn delete_reason(sale_number: &str) -> String {
    format!("Estorno da venda excluída #{}", sale_number)
}

/// Generates sale numbers of the form `YYYYMMDD` + zero-padded
/// milliseconds since UTC midnight. Reserved values are strictly
/// increasing, so the generator never issues the same number twice within
/// a process even when called concurrently in the same millisecond.
#[derive(Debug, Default)]
pub struct SaleNumberGenerator {
    last_millis: AtomicI64,
}

impl SaleNumberGenerator {
    pub fn next(&self) -> String {
        let millis = self.reserve(Utc::now().timestamp_millis());
        Self::format(millis)
    }

    /// Reserve a millisecond value strictly greater than any previously
    /// reserved one.
    fn reserve(&self, now: i64) -> i64 {
        let mut last = self.last_millis.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last_millis.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return candidate,
                Err(observed) => last = observed,
            }
        }
    }

    fn format(millis: i64) -> String {
        let dt = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_else(Utc::now);
        format!("{}{:08}", dt.format("%Y%m%d"), millis.rem_euclid(86_400_000))
    }
}

/// One requested line of a new sale
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SaleItemInput {
    pub part_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub discount: Option<Decimal>,
}

/// Input for creating a sale. Items are immutable after creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSaleInput {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_document: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub discount: Option<Decimal>,
    pub notes: Option<String>,
    /// Initial status; defaults to CONFIRMED (stock leaves immediately)
    pub status: Option<SaleStatus>,
    pub items: Vec<SaleItemInput>,
}

/// Input for updating a sale header and/or status. Absent fields are left
/// unchanged; items cannot be edited.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct UpdateSaleInput {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_document: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub discount: Option<Decimal>,
    pub notes: Option<String>,
    pub status: Option<SaleStatus>,
}

/// Listing filters
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleFilters {
    pub search: Option<String>,
    pub status: Option<SaleStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/// Sale line enriched with the referenced part's code and name
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemDetail {
    pub id: Uuid,
    pub part_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub total: Decimal,
    pub part_code: String,
    pub part_name: String,
}

/// A sale with its ordered items
#[derive(Debug, Serialize)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItemDetail>,
}

/// Result of deleting a sale
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSaleOutcome {
    pub sale_number: String,
    pub stock_returned: bool,
}

/// Checked creation input: initial status, per-line totals, grand total.
fn validate_create(input: &CreateSaleInput) -> AppResult<(SaleStatus, Vec<Decimal>, Decimal)> {
    let status = input.status.unwrap_or(SaleStatus::Confirmed);
    if status == SaleStatus::Cancelled {
        return Err(AppError::Validation(
            "A sale cannot be created as CANCELLED".to_string(),
        ));
    }

    if input.items.is_empty() {
        return Err(AppError::Validation(
            "At least one item is required".to_string(),
        ));
    }

    let mut line_totals = Vec::with_capacity(input.items.len());
    for item in &input.items {
        if item.quantity <= 0 {
            return Err(AppError::Validation(
                "Item quantity must be positive".to_string(),
            ));
        }
        if item.price < Decimal::ZERO {
            return Err(AppError::Validation(
                "Item price cannot be negative".to_string(),
            ));
        }
        if item.discount.is_some_and(|d| d < Decimal::ZERO) {
            return Err(AppError::Validation(
                "Item discount cannot be negative".to_string(),
            ));
        }
        let total = line_total(item.quantity, item.price, item.discount);
        if total < Decimal::ZERO {
            return Err(AppError::Validation(
                "Item discount cannot exceed the line amount".to_string(),
            ));
        }
        line_totals.push(total);
    }

    if input.discount.is_some_and(|d| d < Decimal::ZERO) {
        return Err(AppError::Validation(
            "Discount cannot be negative".to_string(),
        ));
    }

    let total = sale_total(&line_totals, input.discount);
    if total < Decimal::ZERO {
        return Err(AppError::Validation(
            "Discount cannot exceed the sale total".to_string(),
        ));
    }

    Ok((status, line_totals, total))
}

const SALE_COLUMNS: &str = "id, sale_number, customer_name, customer_email, customer_phone, \
     customer_document, status, payment_method, discount, total, notes, user_id, \
     created_at, updated_at";

const SALE_FILTER_WHERE: &str = "\
     ($1::text IS NULL OR sale_number ILIKE '%' || $1 || '%' \
        OR customer_name ILIKE '%' || $1 || '%' \
        OR customer_email ILIKE '%' || $1 || '%' \
        OR customer_phone ILIKE '%' || $1 || '%') \
     AND ($2::text IS NULL OR status = $2) \
     AND ($3::text IS NULL OR payment_method = $3) \
     AND ($4::timestamptz IS NULL OR created_at >= $4) \
     AND ($5::timestamptz IS NULL OR created_at < $5)";

/// Sale lifecycle service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
    numbers: Arc<SaleNumberGenerator>,
}

impl SaleService {
    /// Create a new SaleService instance. The number generator is shared
    /// process-wide through the application state.
    pub fn new(db: PgPool, numbers: Arc<SaleNumberGenerator>) -> Self {
        Self { db, numbers }
    }

    /// Create a sale with its items. When the initial status holds stock,
    /// each part is decremented and an OUT movement referencing the sale
    /// number is appended, all inside one transaction.
    pub async fn create_sale(
        &self,
        user_id: Uuid,
        input: CreateSaleInput,
    ) -> AppResult<SaleWithItems> {
        let (status, line_totals, total) = validate_create(&input)?;
        let sale_number = self.numbers.next();

        let mut tx = self.db.begin().await?;

        // Lock every part and check availability before writing anything
        let mut locked = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let part = stock::lock_part(&mut tx, item.part_id).await?;
            if part.stock < item.quantity {
                return Err(AppError::InsufficientStock { part: part.name });
            }
            locked.push(part);
        }

        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            INSERT INTO sales (sale_number, customer_name, customer_email, customer_phone,
                               customer_document, status, payment_method, discount, total,
                               notes, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(&sale_number)
        .bind(&input.customer_name)
        .bind(&input.customer_email)
        .bind(&input.customer_phone)
        .bind(&input.customer_document)
        .bind(status)
        .bind(input.payment_method)
        .bind(input.discount)
        .bind(total)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for (line_no, ((item, line_total), part)) in input
            .items
            .iter()
            .zip(&line_totals)
            .zip(&locked)
            .enumerate()
        {
            let row = sqlx::query_as::<_, SaleItem>(
                r#"
                INSERT INTO sale_items (sale_id, part_id, line_no, quantity, price, discount, total)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, sale_id, part_id, quantity, price, discount, total, created_at
                "#,
            )
            .bind(sale.id)
            .bind(item.part_id)
            .bind(line_no as i32 + 1)
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.discount)
            .bind(line_total)
            .fetch_one(&mut *tx)
            .await?;

            items.push(SaleItemDetail {
                id: row.id,
                part_id: row.part_id,
                quantity: row.quantity,
                price: row.price,
                discount: row.discount,
                total: row.total,
                part_code: part.code.clone(),
                part_name: part.name.clone(),
            });
        }

        if status.holds_stock() {
            for (item, part) in input.items.iter().zip(&locked) {
                stock::take_stock(&mut tx, part, item.quantity).await?;
                stock::record_movement(
                    &mut tx,
                    part.id,
                    MovementType::Out,
                    item.quantity,
                    REASON_SALE,
                    Some(&sale_number),
                )
                .await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            sale_number = %sale.sale_number,
            status = status.as_str(),
            items = items.len(),
            "sale created"
        );

        Ok(SaleWithItems { sale, items })
    }

    /// Update a sale's header fields and optionally its status. Stock and
    /// ledger follow the status transition: PENDING→CONFIRMED commits
    /// stock, CONFIRMED→PENDING and CONFIRMED→CANCELLED release it.
    pub async fn update_sale(
        &self,
        sale_id: Uuid,
        input: UpdateSaleInput,
    ) -> AppResult<SaleWithItems> {
        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = $1 FOR UPDATE"
        ))
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        if sale.status == SaleStatus::Delivered {
            return Err(AppError::InvalidTransition(
                "A delivered sale cannot be edited".to_string(),
            ));
        }

        let next_status = input.status.unwrap_or(sale.status);
        if !sale.status.can_transition_to(next_status) {
            return Err(AppError::InvalidTransition(format!(
                "{} -> {}",
                sale.status.as_str(),
                next_status.as_str()
            )));
        }

        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, part_id, quantity, price, discount, total, created_at
            FROM sale_items
            WHERE sale_id = $1
            ORDER BY line_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await?;

        match sale.status.stock_effect(next_status) {
            StockEffect::Commit => {
                for item in &items {
                    let part = stock::lock_part(&mut tx, item.part_id).await?;
                    stock::take_stock(&mut tx, &part, item.quantity).await?;
                    stock::record_movement(
                        &mut tx,
                        part.id,
                        MovementType::Out,
                        item.quantity,
                        REASON_SALE,
                        Some(&sale.sale_number),
                    )
                    .await?;
                }
            }
            StockEffect::Release => {
                let reason = release_reason(&sale.sale_number);
                for item in &items {
                    let part = stock::lock_part(&mut tx, item.part_id).await?;
                    stock::return_stock(&mut tx, &part, item.quantity).await?;
                    stock::record_movement(
                        &mut tx,
                        part.id,
                        MovementType::In,
                        item.quantity,
                        &reason,
                        Some(&sale.sale_number),
                    )
                    .await?;
                }
            }
            StockEffect::None => {}
        }

        let discount = input.discount.or(sale.discount);
        if discount.is_some_and(|d| d < Decimal::ZERO) {
            return Err(AppError::Validation(
                "Discount cannot be negative".to_string(),
            ));
        }
        let item_sum: Decimal = items.iter().map(|i| i.total).sum();
        let total = item_sum - discount.unwrap_or(Decimal::ZERO);
        if total < Decimal::ZERO {
            return Err(AppError::Validation(
                "Discount cannot exceed the sale total".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Sale>(&format!(
            r#"
            UPDATE sales
            SET customer_name = $2, customer_email = $3, customer_phone = $4,
                customer_document = $5, status = $6, payment_method = $7,
                discount = $8, total = $9, notes = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(sale_id)
        .bind(input.customer_name.or(sale.customer_name))
        .bind(input.customer_email.or(sale.customer_email))
        .bind(input.customer_phone.or(sale.customer_phone))
        .bind(input.customer_document.or(sale.customer_document))
        .bind(next_status)
        .bind(input.payment_method.or(sale.payment_method))
        .bind(discount)
        .bind(total)
        .bind(input.notes.or(sale.notes))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            sale_number = %updated.sale_number,
            status = updated.status.as_str(),
            "sale updated"
        );

        let mut items_by_sale = self.load_items(&[sale_id]).await?;
        Ok(SaleWithItems {
            sale: updated,
            items: items_by_sale.remove(&sale_id).unwrap_or_default(),
        })
    }

    /// Delete a sale. A CONFIRMED sale has its stock restored with IN
    /// estorno movements before the row (and its items, by cascade) is
    /// removed. Delivered sales cannot be deleted.
    pub async fn delete_sale(&self, sale_id: Uuid) -> AppResult<DeleteSaleOutcome> {
        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = $1 FOR UPDATE"
        ))
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        if sale.status == SaleStatus::Delivered {
            return Err(AppError::InvalidTransition(
                "A delivered sale cannot be deleted; cancel it first".to_string(),
            ));
        }

        let stock_returned = sale.status.holds_stock();
        if stock_returned {
            let items = sqlx::query_as::<_, SaleItem>(
                r#"
                SELECT id, sale_id, part_id, quantity, price, discount, total, created_at
                FROM sale_items
                WHERE sale_id = $1
                ORDER BY line_no
                "#,
            )
            .bind(sale_id)
            .fetch_all(&mut *tx)
            .await?;

            let reason = delete_reason(&sale.sale_number);
            for item in &items {
                let part = stock::lock_part(&mut tx, item.part_id).await?;
                stock::return_stock(&mut tx, &part, item.quantity).await?;
                stock::record_movement(
                    &mut tx,
                    part.id,
                    MovementType::In,
                    item.quantity,
                    &reason,
                    None,
                )
                .await?;
            }
        }

        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            sale_number = %sale.sale_number,
            stock_returned,
            "sale deleted"
        );

        Ok(DeleteSaleOutcome {
            sale_number: sale.sale_number,
            stock_returned,
        })
    }

    /// Load a single sale with its items.
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<SaleWithItems> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = $1"
        ))
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let mut items_by_sale = self.load_items(&[sale_id]).await?;
        Ok(SaleWithItems {
            sale,
            items: items_by_sale.remove(&sale_id).unwrap_or_default(),
        })
    }

    /// List sales newest-first with filters and pagination. Returns the
    /// page plus the total row count for the filter.
    pub async fn list_sales(
        &self,
        filters: &SaleFilters,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<SaleWithItems>, u64)> {
        let search = filters
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let status = filters.status.map(|s| s.as_str());
        let payment = filters.payment_method.map(|p| p.as_str());
        let start = filters
            .start_date
            .map(|d| d.and_time(NaiveTime::MIN).and_utc());
        let end = filters
            .end_date
            .map(|d| d.succ_opt().unwrap_or(d).and_time(NaiveTime::MIN).and_utc());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM sales WHERE {SALE_FILTER_WHERE}"
        ))
        .bind(search)
        .bind(status)
        .bind(payment)
        .bind(start)
        .bind(end)
        .fetch_one(&self.db)
        .await?;

        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS} FROM sales
            WHERE {SALE_FILTER_WHERE}
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(search)
        .bind(status)
        .bind(payment)
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();
        let mut items_by_sale = self.load_items(&ids).await?;

        let data = sales
            .into_iter()
            .map(|sale| {
                let items = items_by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithItems { sale, items }
            })
            .collect();

        Ok((data, total as u64))
    }

    /// Fetch the items of the given sales joined with part code/name,
    /// grouped by sale and ordered by entry order.
    async fn load_items(
        &self,
        sale_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<SaleItemDetail>>> {
        if sale_ids.is_empty() {
            return Ok(HashMap::new());
        }

        #[derive(sqlx::FromRow)]
        struct ItemRow {
            sale_id: Uuid,
            #[sqlx(flatten)]
            detail: SaleItemDetail,
        }

        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT si.sale_id, si.id, si.part_id, si.quantity, si.price, si.discount, si.total,
                   p.code AS part_code, p.name AS part_name
            FROM sale_items si
            JOIN parts p ON p.id = si.part_id
            WHERE si.sale_id = ANY($1)
            ORDER BY si.sale_id, si.line_no
            "#,
        )
        .bind(sale_ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<SaleItemDetail>> = HashMap::new();
        for row in rows {
            grouped.entry(row.sale_id).or_default().push(row.detail);
        }
        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(quantity: i32, price: &str) -> SaleItemInput {
        SaleItemInput {
            part_id: Uuid::new_v4(),
            quantity,
            price: dec(price),
            discount: None,
        }
    }

    fn create_input(items: Vec<SaleItemInput>) -> CreateSaleInput {
        CreateSaleInput {
            customer_name: None,
            customer_email: None,
            customer_phone: None,
            customer_document: None,
            payment_method: None,
            discount: None,
            notes: None,
            status: None,
            items,
        }
    }

    #[test]
    fn test_create_defaults_to_confirmed() {
        let input = create_input(vec![item(1, "10")]);
        let (status, _, _) = validate_create(&input).unwrap();
        assert_eq!(status, SaleStatus::Confirmed);
    }

    #[test]
    fn test_create_totals() {
        // [{qty 2, price 10}, {qty 1, price 5}] with no discount => 25
        let input = create_input(vec![item(2, "10"), item(1, "5")]);
        let (_, line_totals, total) = validate_create(&input).unwrap();
        assert_eq!(line_totals, vec![dec("20"), dec("5")]);
        assert_eq!(total, dec("25"));
    }

    #[test]
    fn test_create_with_discounts() {
        let mut input = create_input(vec![item(2, "45.90")]);
        input.items[0].discount = Some(dec("1.80"));
        input.discount = Some(dec("10"));
        let (_, line_totals, total) = validate_create(&input).unwrap();
        assert_eq!(line_totals, vec![dec("90.00")]);
        assert_eq!(total, dec("80.00"));
    }

    #[test]
    fn test_create_rejects_empty_items() {
        let input = create_input(vec![]);
        assert!(matches!(
            validate_create(&input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_create_rejects_bad_quantities_and_prices() {
        assert!(validate_create(&create_input(vec![item(0, "10")])).is_err());
        assert!(validate_create(&create_input(vec![item(-1, "10")])).is_err());
        assert!(validate_create(&create_input(vec![item(1, "-10")])).is_err());
    }

    #[test]
    fn test_create_rejects_cancelled_status() {
        let mut input = create_input(vec![item(1, "10")]);
        input.status = Some(SaleStatus::Cancelled);
        assert!(matches!(
            validate_create(&input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_create_rejects_negative_totals() {
        // item discount larger than the line amount
        let mut input = create_input(vec![item(1, "10")]);
        input.items[0].discount = Some(dec("15"));
        assert!(validate_create(&input).is_err());

        // header discount larger than the sum of lines
        let mut input = create_input(vec![item(1, "10")]);
        input.discount = Some(dec("15"));
        assert!(validate_create(&input).is_err());
    }

    #[test]
    fn test_sale_number_format() {
        let gen = SaleNumberGenerator::default();
        let number = gen.next();
        assert_eq!(number.len(), 16);
        assert!(number.chars().all(|c| c.is_ascii_digit()));
        let today = Utc::now().format("%Y%m%d").to_string();
        assert!(number.starts_with(&today));
    }

    #[test]
    fn test_sale_numbers_unique_sequentially() {
        let gen = SaleNumberGenerator::default();
        let numbers: HashSet<String> = (0..1000).map(|_| gen.next()).collect();
        assert_eq!(numbers.len(), 1000);
    }

    #[test]
    fn test_sale_numbers_unique_across_threads() {
        let gen = Arc::new(SaleNumberGenerator::default());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let gen = Arc::clone(&gen);
            handles.push(std::thread::spawn(move || {
                (0..200).map(|_| gen.next()).collect::<Vec<_>>()
            }));
        }

        let mut all = HashSet::new();
        for handle in handles {
            for number in handle.join().unwrap() {
                assert!(all.insert(number), "duplicate sale number issued");
            }
        }
        assert_eq!(all.len(), 8 * 200);
    }

    #[test]
    fn test_sale_numbers_strictly_increase() {
        let gen = SaleNumberGenerator::default();
        let mut prev = gen.next();
        for _ in 0..100 {
            let next = gen.next();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn test_reserved_millis_skip_past_collisions() {
        let gen = SaleNumberGenerator::default();
        let t = 1_700_000_000_000;
        assert_eq!(gen.reserve(t), t);
        // same clock reading twice: second reservation moves forward
        assert_eq!(gen.reserve(t), t + 1);
        // clock going backwards still moves forward
        assert_eq!(gen.reserve(t - 50), t + 2);
    }

    #[test]
    fn test_ledger_reasons_name_the_sale() {
        assert_eq!(release_reason("20260807001"), "Estorno da venda #20260807001");
        assert!(delete_reason("20260807001").contains("20260807001"));
        assert!(delete_reason("20260807001").contains("excluída"));
    }
}
