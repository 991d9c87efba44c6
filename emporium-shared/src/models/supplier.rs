//! Supplier model and database operations
//!
//! Suppliers are vendor accounts. They authenticate like customers and staff
//! but carry the implicit role `Supplier`.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE suppliers (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     contact_email VARCHAR(255) NOT NULL UNIQUE,
//!     password_hash VARCHAR(255) NOT NULL,
//!     address TEXT,
//!     auth_token_hash CHAR(64),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Supplier row, including credentials
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_email: String,
    pub password_hash: String,
    pub address: Option<String>,
    pub auth_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public view of a supplier
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "email")]
    pub contact_email: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a supplier account
#[derive(Debug, Clone)]
pub struct CreateSupplier {
    pub name: String,
    pub contact_email: String,
    pub password_hash: String,
    pub address: Option<String>,
}

const SUPPLIER_COLUMNS: &str =
    "id, name, contact_email, password_hash, address, auth_token_hash, created_at";

impl Supplier {
    /// Inserts a new supplier
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `suppliers_contact_email_key`.
    pub async fn create(pool: &PgPool, data: CreateSupplier) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO suppliers (name, contact_email, password_hash, address) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            SUPPLIER_COLUMNS
        );

        sqlx::query_as::<_, Supplier>(&query)
            .bind(data.name)
            .bind(data.contact_email)
            .bind(data.password_hash)
            .bind(data.address)
            .fetch_one(pool)
            .await
    }

    /// Finds a supplier by id
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM suppliers WHERE id = $1", SUPPLIER_COLUMNS);

        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a supplier by contact email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM suppliers WHERE contact_email = $1",
            SUPPLIER_COLUMNS
        );

        sqlx::query_as::<_, Supplier>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Replaces (or clears, with `None`) the stored session token digest
    pub async fn set_token_hash(
        pool: &PgPool,
        id: Uuid,
        token_hash: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE suppliers SET auth_token_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists suppliers by name
    pub async fn list(pool: &PgPool) -> Result<Vec<SupplierSummary>, sqlx::Error> {
        sqlx::query_as::<_, SupplierSummary>(
            "SELECT id, name, contact_email, address, created_at FROM suppliers ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }

    /// Drops credential columns
    pub fn summary(&self) -> SupplierSummary {
        SupplierSummary {
            id: self.id,
            name: self.name.clone(),
            contact_email: self.contact_email.clone(),
            address: self.address.clone(),
            created_at: self.created_at,
        }
    }
}
