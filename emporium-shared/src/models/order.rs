//! Orders and order lines
//!
//! An order is created from a customer's cart in one transaction: the order
//! row, one line per cart item with a snapshot of the product's price at that
//! moment, the computed total and the emptied cart either all commit or none
//! of them do.
//!
//! `status` is free-form text. The storefront uses the values in
//! [`KNOWN_ORDER_STATUSES`], but the column accepts anything staff send.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE orders (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     customer_id UUID NOT NULL REFERENCES customers (id) ON DELETE CASCADE,
//!     status VARCHAR(32) NOT NULL DEFAULT 'pending',
//!     total_amount NUMERIC(12, 2) NOT NULL DEFAULT 0,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE order_items (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     order_id UUID NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
//!     product_id UUID REFERENCES products (id) ON DELETE SET NULL,
//!     quantity INTEGER NOT NULL CHECK (quantity > 0),
//!     price NUMERIC(12, 2) NOT NULL
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use emporium_shared::models::order::{Order, OrderError};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, customer_id: Uuid) -> Result<(), OrderError> {
//! match Order::create_from_cart(&pool, customer_id).await {
//!     Ok(placed) => println!("order {} total {}", placed.order.id, placed.order.total_amount),
//!     Err(OrderError::EmptyCart) => println!("nothing to order"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

/// Status assigned to new orders
pub const STATUS_PENDING: &str = "pending";

/// Status set by a successful payment
pub const STATUS_PAID: &str = "paid";

/// Status set by a failed payment
pub const STATUS_FAILED: &str = "failed";

/// Statuses the storefront knows how to display
pub const KNOWN_ORDER_STATUSES: [&str; 7] = [
    STATUS_PENDING,
    STATUS_PAID,
    "processing",
    "shipped",
    "delivered",
    "cancelled",
    STATUS_FAILED,
];

/// Whether `status` is one of [`KNOWN_ORDER_STATUSES`]
pub fn is_known_status(status: &str) -> bool {
    KNOWN_ORDER_STATUSES.contains(&status)
}

/// Error type for order placement
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The customer has no cart, or the cart has no lines
    #[error("Cart is empty")]
    EmptyCart,

    /// The cart total does not fit in an order amount
    #[error("Order total exceeds the maximum")]
    TotalTooLarge,

    /// Database error; the transaction was rolled back
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order line as stored
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    /// `None` once the product has been deleted from the catalog
    pub product_id: Option<Uuid>,
    pub quantity: i32,
    /// Unit price captured when the order was placed
    pub price: Decimal,
}

/// Order line with the product name, when the product still exists
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub quantity: i32,
    pub price: Decimal,
    pub name: Option<String>,
}

/// A cart line priced at the moment of checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl PricedLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Total of a set of priced lines
///
/// ```
/// use emporium_shared::models::order::{order_total, PricedLine};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let lines = [
///     PricedLine { product_id: Uuid::new_v4(), quantity: 2, unit_price: Decimal::new(1000, 2) },
///     PricedLine { product_id: Uuid::new_v4(), quantity: 1, unit_price: Decimal::new(500, 2) },
/// ];
/// assert_eq!(order_total(&lines), Decimal::new(2500, 2));
/// ```
pub fn order_total(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(PricedLine::line_total).sum()
}

/// Largest amount the `orders.total_amount` column holds
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Result of a successful checkout
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

const ORDER_COLUMNS: &str = "id, customer_id, status, total_amount, created_at, updated_at";

impl Order {
    /// Turns the customer's cart into an order
    ///
    /// Runs in one transaction with the cart row locked, so two concurrent
    /// checkouts of the same cart cannot both succeed: the second one finds
    /// the cart empty.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`] if there is no cart or it has no lines;
    ///   nothing is written in that case.
    /// - [`OrderError::TotalTooLarge`] if the total exceeds
    ///   [`MAX_ORDER_TOTAL`]; the cart is left untouched.
    /// - [`OrderError::Database`] on any database failure; the transaction is
    ///   rolled back and the cart is left untouched.
    pub async fn create_from_cart(
        pool: &PgPool,
        customer_id: Uuid,
    ) -> Result<PlacedOrder, OrderError> {
        let mut tx = pool.begin().await?;

        let cart_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM carts WHERE customer_id = $1 FOR UPDATE")
                .bind(customer_id)
                .fetch_optional(&mut *tx)
                .await?;

        let cart_id = cart_id.ok_or(OrderError::EmptyCart)?;

        let lines = sqlx::query_as::<_, PricedLine>(
            r#"
            SELECT ci.product_id, ci.quantity, p.price AS unit_price
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.product_id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let total = order_total(&lines);
        if total > MAX_ORDER_TOTAL {
            return Err(OrderError::TotalTooLarge);
        }

        let order_id: Uuid = sqlx::query_scalar(
            "INSERT INTO orders (customer_id, status) VALUES ($1, $2) RETURNING id",
        )
        .bind(customer_id)
        .bind(STATUS_PENDING)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, order_id, product_id, quantity, price
                "#,
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .fetch_one(&mut *tx)
            .await?;

            items.push(item);
        }

        let query = format!(
            "UPDATE orders SET total_amount = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .bind(total)
            .fetch_one(&mut *tx)
            .await?;

        let cleared = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(cart_id = %cart_id, cleared = cleared.rows_affected(), "Cart cleared");
        info!(
            order_id = %order.id,
            customer_id = %customer_id,
            lines = items.len(),
            total = %order.total_amount,
            "Order placed"
        );

        Ok(PlacedOrder { order, items })
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);

        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Orders placed by one customer, newest first
    pub async fn list_by_customer(
        pool: &PgPool,
        customer_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
            ORDER_COLUMNS
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }

    /// Every order, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM orders ORDER BY created_at DESC", ORDER_COLUMNS);

        sqlx::query_as::<_, Order>(&query).fetch_all(pool).await
    }

    /// Lines of an order with product names
    pub async fn items(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderItemDetail>, sqlx::Error> {
        sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT oi.id, oi.product_id, oi.quantity, oi.price, p.name
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY p.name NULLS LAST
            "#,
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }

    /// Stores `status` verbatim
    ///
    /// Returns `None` if the order does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(quantity: i32, cents: i64) -> PricedLine {
        PricedLine {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn test_order_total_matches_line_sum() {
        let lines = [priced(2, 1000), priced(1, 500)];

        assert_eq!(order_total(&lines), Decimal::new(2500, 2));
        assert_eq!(lines[0].line_total(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_order_total_keeps_cents_exact() {
        // 3 x 0.10 must be exactly 0.30, not a float approximation
        let lines = [priced(3, 10), priced(7, 1999)];

        assert_eq!(order_total(&lines), Decimal::new(14023, 2));
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_known_statuses() {
        for status in ["pending", "paid", "processing", "shipped", "delivered", "cancelled", "failed"] {
            assert!(is_known_status(status), "{status} should be known");
        }

        assert!(!is_known_status("Shipped"));
        assert!(!is_known_status("teleported"));
        assert!(!is_known_status(""));
    }

    #[test]
    fn test_order_error_display() {
        assert_eq!(OrderError::EmptyCart.to_string(), "Cart is empty");
        assert_eq!(OrderError::TotalTooLarge.to_string(), "Order total exceeds the maximum");
    }

    #[test]
    fn test_max_order_total_fits_numeric_12_2() {
        assert_eq!(MAX_ORDER_TOTAL, Decimal::new(999_999_999_999, 2));

        let at_limit = [priced(1, 999_999_999_999)];
        assert!(order_total(&at_limit) <= MAX_ORDER_TOTAL);

        let over = [priced(i32::MAX, 99_999_999), priced(1, 1)];
        assert!(order_total(&over) > MAX_ORDER_TOTAL);
    }
}
