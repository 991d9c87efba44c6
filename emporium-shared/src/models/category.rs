//! Product categories
//!
//! ```sql
//! CREATE TABLE categories (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL UNIQUE,
//!     description TEXT,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    /// Inserts a category; duplicate names violate `categories_name_key`
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
