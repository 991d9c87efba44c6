//! Shopping carts
//!
//! Each customer has at most one cart row, created lazily on the first cart
//! update. Lines are keyed by `(cart_id, product_id)`; setting a line's
//! quantity overwrites it rather than adding to it.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE carts (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     customer_id UUID NOT NULL UNIQUE REFERENCES customers (id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE cart_items (
//!     cart_id UUID NOT NULL REFERENCES carts (id) ON DELETE CASCADE,
//!     product_id UUID NOT NULL REFERENCES products (id) ON DELETE CASCADE,
//!     quantity INTEGER NOT NULL CHECK (quantity > 0),
//!     PRIMARY KEY (cart_id, product_id)
//! );
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with the product's current name, price and image
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub line_total: Decimal,
}

/// Outcome of [`Cart::set_item_quantity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CartChange {
    /// The line now holds exactly `quantity` units
    Set { quantity: i32 },

    /// The line was removed (`existed` is false if there was nothing to remove)
    Removed { existed: bool },
}

/// Sum of line totals
pub fn subtotal(lines: &[CartLine]) -> Decimal {
    lines.iter().map(|line| line.line_total).sum()
}

impl Cart {
    /// The customer's cart, if one has been created
    pub async fn find_by_customer(
        pool: &PgPool,
        customer_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Cart>(
            "SELECT id, customer_id, created_at FROM carts WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(pool)
        .await
    }

    /// Returns the customer's cart, creating it on first use
    ///
    /// The upsert keeps two concurrent first requests from creating two carts.
    pub async fn get_or_create(pool: &PgPool, customer_id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (customer_id)
            VALUES ($1)
            ON CONFLICT (customer_id) DO UPDATE SET customer_id = EXCLUDED.customer_id
            RETURNING id, customer_id, created_at
            "#,
        )
        .bind(customer_id)
        .fetch_one(pool)
        .await
    }

    /// Lines in a cart, by product name
    pub async fn lines(pool: &PgPool, cart_id: Uuid) -> Result<Vec<CartLine>, sqlx::Error> {
        sqlx::query_as::<_, CartLine>(
            r#"
            SELECT ci.product_id, ci.quantity, p.name, p.price, p.image,
                   p.price * ci.quantity AS line_total
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(cart_id)
        .fetch_all(pool)
        .await
    }

    /// Sets one line's quantity
    ///
    /// `quantity <= 0` deletes the line. A positive quantity inserts the line
    /// or overwrites the stored quantity, so repeating a call is a no-op.
    pub async fn set_item_quantity(
        pool: &PgPool,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartChange, sqlx::Error> {
        if quantity <= 0 {
            let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .execute(pool)
                .await?;

            return Ok(CartChange::Removed {
                existed: result.rows_affected() > 0,
            });
        }

        let stored: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
            RETURNING quantity
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(pool)
        .await?;

        Ok(CartChange::Set { quantity: stored })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, price: Decimal) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            quantity,
            name: "item".to_string(),
            price,
            image: None,
            line_total: price * Decimal::from(quantity),
        }
    }

    #[test]
    fn test_subtotal() {
        let lines = vec![
            line(2, Decimal::new(1000, 2)),
            line(1, Decimal::new(500, 2)),
        ];

        assert_eq!(subtotal(&lines), Decimal::new(2500, 2));
        assert_eq!(subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_cart_change_serialization() {
        let set = serde_json::to_value(CartChange::Set { quantity: 3 }).unwrap();
        assert_eq!(set["action"], "set");
        assert_eq!(set["quantity"], 3);

        let removed = serde_json::to_value(CartChange::Removed { existed: true }).unwrap();
        assert_eq!(removed["action"], "removed");
        assert_eq!(removed["existed"], true);
    }
}
