//! Product catalog
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE products (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     description TEXT,
//!     price NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
//!     category_id UUID REFERENCES categories (id) ON DELETE SET NULL,
//!     image VARCHAR(1024),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use emporium_shared::models::product::{Product, ProductFilter};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! let mugs = Product::search(&pool, &ProductFilter {
//!     query: Some("mug".to_string()),
//!     category_id: None,
//! }).await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Catalog item
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product id
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Long description
    pub description: Option<String>,

    /// Current unit price; orders snapshot this value
    pub price: Decimal,

    /// Owning category, if any
    pub category_id: Option<Uuid>,

    /// Image URL
    pub image: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written on create and on full update
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    pub image: Option<String>,
}

/// Search criteria for [`Product::search`]
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against name and description
    pub query: Option<String>,

    /// Restrict to one category
    pub category_id: Option<Uuid>,
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, category_id, image, created_at, updated_at";

/// Builds an `ILIKE` pattern matching `term` anywhere, with wildcards escaped
///
/// ```
/// use emporium_shared::models::product::contains_pattern;
///
/// assert_eq!(contains_pattern("mug"), "%mug%");
/// assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
/// ```
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Product {
    /// Inserts a product
    pub async fn create(pool: &PgPool, data: ProductInput) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (name, description, price, category_id, image) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PRODUCT_COLUMNS
        );

        sqlx::query_as::<_, Product>(&query)
            .bind(data.name)
            .bind(data.description)
            .bind(data.price)
            .bind(data.category_id)
            .bind(data.image)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);

        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Searches the catalog
    ///
    /// An empty filter returns every product. Results are ordered by name.
    pub async fn search(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(contains_pattern);

        let query = format!(
            "SELECT {} FROM products \
             WHERE ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1) \
               AND ($2::uuid IS NULL OR category_id = $2) \
             ORDER BY name",
            PRODUCT_COLUMNS
        );

        sqlx::query_as::<_, Product>(&query)
            .bind(pattern)
            .bind(filter.category_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrites every editable field
    ///
    /// Returns `None` when no product has `id`.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: ProductInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE products \
             SET name = $2, description = $3, price = $4, category_id = $5, image = $6, \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        );

        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(data.name)
            .bind(data.description)
            .bind(data.price)
            .bind(data.category_id)
            .bind(data.image)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a product; returns whether a row was removed
    ///
    /// Cart lines and stock rows cascade. Order lines keep their price
    /// snapshot with a NULL product reference.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_plain() {
        assert_eq!(contains_pattern("Tea Pot"), "%Tea Pot%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\dir"), "%c:\\\\dir%");
    }

    #[test]
    fn test_product_price_serializes_as_string() {
        let product = Product {
            id: Uuid::new_v4(),
            name: "Kettle".to_string(),
            description: None,
            price: Decimal::new(1999, 2),
            category_id: None,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], "19.99");
        assert!(json["categoryId"].is_null());
    }
}
