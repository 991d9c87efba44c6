//! Warehouses and per-warehouse stock
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE warehouses (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     location VARCHAR(512),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE stock (
//!     warehouse_id UUID NOT NULL REFERENCES warehouses (id) ON DELETE CASCADE,
//!     product_id UUID NOT NULL REFERENCES products (id) ON DELETE CASCADE,
//!     quantity INTEGER NOT NULL CHECK (quantity >= 0),
//!     PRIMARY KEY (warehouse_id, product_id)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields written on create and on full update
#[derive(Debug, Clone)]
pub struct WarehouseInput {
    pub name: String,
    pub location: Option<String>,
}

/// One product's stock level in a warehouse, with display fields
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockLine {
    pub warehouse_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub image: Option<String>,
}

/// Stock row after an intake
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub warehouse_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl Warehouse {
    pub async fn create(pool: &PgPool, data: WarehouseInput) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (name, location)
            VALUES ($1, $2)
            RETURNING id, name, location, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.location)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Warehouse>(
            "SELECT id, name, location, created_at FROM warehouses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Warehouse>(
            "SELECT id, name, location, created_at FROM warehouses ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }

    /// Overwrites name and location; `None` if the warehouse does not exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: WarehouseInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses
            SET name = $2, location = $3
            WHERE id = $1
            RETURNING id, name, location, created_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.location)
        .fetch_optional(pool)
        .await
    }

    /// Stock lines held in a warehouse, by product name
    pub async fn stock(pool: &PgPool, warehouse_id: Uuid) -> Result<Vec<StockLine>, sqlx::Error> {
        sqlx::query_as::<_, StockLine>(
            r#"
            SELECT s.warehouse_id, s.product_id, s.quantity, p.name, p.image
            FROM stock s
            JOIN products p ON p.id = s.product_id
            WHERE s.warehouse_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(pool)
        .await
    }

    /// Adds `quantity` units of a product to a warehouse
    ///
    /// Intake accumulates: the first call inserts the row, later calls add to
    /// it in the same statement, so concurrent intakes never lose an update.
    pub async fn add_stock(
        pool: &PgPool,
        warehouse_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Stock, sqlx::Error> {
        sqlx::query_as::<_, Stock>(
            r#"
            INSERT INTO stock (warehouse_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (warehouse_id, product_id)
            DO UPDATE SET quantity = stock.quantity + EXCLUDED.quantity
            RETURNING warehouse_id, product_id, quantity
            "#,
        )
        .bind(warehouse_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(pool)
        .await
    }
}
