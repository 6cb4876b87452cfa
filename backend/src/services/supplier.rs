//! Suppliers service

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::Supplier;
use shared::validation::{normalize_document, validate_cnpj};

use crate::error::{AppError, AppResult};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSupplierInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cnpj: Option<String>,
    pub contact: Option<String>,
}

/// Input for updating a supplier
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cnpj: Option<String>,
    pub contact: Option<String>,
}

/// Supplier with the number of parts referencing it
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SupplierWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub supplier: Supplier,
    pub parts_count: i64,
}

/// Validate and normalize an optional CNPJ to bare digits.
fn checked_cnpj(cnpj: Option<&str>) -> AppResult<Option<String>> {
    match cnpj {
        None => Ok(None),
        Some(raw) => {
            if !validate_cnpj(raw) {
                return Err(AppError::Validation("Invalid CNPJ".to_string()));
            }
            Ok(Some(normalize_document(raw)))
        }
    }
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List suppliers name-ordered with their part counts.
    pub async fn list_suppliers(&self) -> AppResult<Vec<SupplierWithCount>> {
        let suppliers = sqlx::query_as::<_, SupplierWithCount>(
            r#"
            SELECT s.id, s.name, s.email, s.phone, s.address, s.cnpj, s.contact,
                   s.created_at, s.updated_at,
                   COUNT(p.id) AS parts_count
            FROM suppliers s
            LEFT JOIN parts p ON p.supplier_id = s.id
            GROUP BY s.id, s.name, s.email, s.phone, s.address, s.cnpj, s.contact,
                     s.created_at, s.updated_at
            ORDER BY s.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    /// Create a supplier. The CNPJ, when given, must have valid check
    /// digits and be unique.
    pub async fn create_supplier(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        let cnpj = checked_cnpj(input.cnpj.as_deref())?;
        if let Some(cnpj) = &cnpj {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM suppliers WHERE cnpj = $1)",
            )
            .bind(cnpj)
            .fetch_one(&self.db)
            .await?;
            if taken {
                return Err(AppError::Conflict("CNPJ already registered".to_string()));
            }
        }

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, email, phone, address, cnpj, contact)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, phone, address, cnpj, contact, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&cnpj)
        .bind(&input.contact)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Update a supplier.
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> AppResult<Supplier> {
        let current = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, email, phone, address, cnpj, contact, created_at, updated_at
            FROM suppliers
            WHERE id = $1
            "#,
        )
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        let cnpj = match input.cnpj.as_deref() {
            Some(raw) => checked_cnpj(Some(raw))?,
            None => current.cnpj.clone(),
        };

        if let Some(cnpj) = &cnpj {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM suppliers WHERE cnpj = $1 AND id <> $2)",
            )
            .bind(cnpj)
            .bind(supplier_id)
            .fetch_one(&self.db)
            .await?;
            if taken {
                return Err(AppError::Conflict("CNPJ already registered".to_string()));
            }
        }

        let name = input.name.unwrap_or(current.name);
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $2, email = $3, phone = $4, address = $5, cnpj = $6, contact = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, phone, address, cnpj, contact, created_at, updated_at
            "#,
        )
        .bind(supplier_id)
        .bind(name.trim())
        .bind(input.email.or(current.email))
        .bind(input.phone.or(current.phone))
        .bind(input.address.or(current.address))
        .bind(&cnpj)
        .bind(input.contact.or(current.contact))
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Delete a supplier. Refused while parts still reference it.
    pub async fn delete_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        let parts_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parts WHERE supplier_id = $1")
                .bind(supplier_id)
                .fetch_one(&self.db)
                .await?;

        if parts_count > 0 {
            return Err(AppError::Conflict(format!(
                "Supplier has {} associated parts and cannot be deleted",
                parts_count
            )));
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        Ok(())
    }
}
