//! Customer model and database operations
//!
//! Customers register themselves, own at most one cart and place orders.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE customers (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     email VARCHAR(255) NOT NULL UNIQUE,
//!     password_hash VARCHAR(255) NOT NULL,
//!     contact_number VARCHAR(32),
//!     address TEXT,
//!     auth_token_hash CHAR(64),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use emporium_shared::models::customer::{CreateCustomer, Customer};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! let customer = Customer::create(&pool, CreateCustomer {
//!     name: "Ada".to_string(),
//!     email: "ada@example.com".to_string(),
//!     password_hash: "$argon2id$...".to_string(),
//!     contact_number: None,
//!     address: Some("12 Analytical Row".to_string()),
//!     auth_token_hash: None,
//! }).await?;
//!
//! let found = Customer::find_by_email(&pool, "ada@example.com").await?;
//! assert_eq!(found.map(|c| c.id), Some(customer.id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Customer row, including credentials
///
/// Never serialize this to clients; use [`CustomerProfile`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    /// Unique customer id
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Login email, unique across customers
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Optional phone number
    pub contact_number: Option<String>,

    /// Optional shipping address
    pub address: Option<String>,

    /// SHA-256 digest of the live session token, `None` when logged out
    pub auth_token_hash: Option<String>,

    /// Registration time
    pub created_at: DateTime<Utc>,
}

/// Public view of a customer
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a customer
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
    /// Argon2id hash, never the plaintext
    pub password_hash: String,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    /// Digest of the session token issued at registration
    pub auth_token_hash: Option<String>,
}

const CUSTOMER_COLUMNS: &str =
    "id, name, email, password_hash, contact_number, address, auth_token_hash, created_at";

const PROFILE_COLUMNS: &str = "id, name, email, contact_number, address, created_at";

impl Customer {
    /// Inserts a new customer
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `customers_email_key` if the email is
    /// already registered.
    pub async fn create(pool: &PgPool, data: CreateCustomer) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (name, email, password_hash, contact_number, address, auth_token_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            CUSTOMER_COLUMNS
        );

        sqlx::query_as::<_, Customer>(&query)
            .bind(data.name)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.contact_number)
            .bind(data.address)
            .bind(data.auth_token_hash)
            .fetch_one(pool)
            .await
    }

    /// Finds a customer by id
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS);

        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a customer by login email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM customers WHERE email = $1", CUSTOMER_COLUMNS);

        sqlx::query_as::<_, Customer>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Replaces (or clears, with `None`) the stored session token digest
    ///
    /// Login overwrites the digest, which ends any session opened elsewhere.
    pub async fn set_token_hash(
        pool: &PgPool,
        id: Uuid,
        token_hash: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE customers SET auth_token_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Public profile by id
    pub async fn profile(pool: &PgPool, id: Uuid) -> Result<Option<CustomerProfile>, sqlx::Error> {
        let query = format!("SELECT {} FROM customers WHERE id = $1", PROFILE_COLUMNS);

        sqlx::query_as::<_, CustomerProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists every customer, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<CustomerProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM customers ORDER BY created_at DESC",
            PROFILE_COLUMNS
        );

        sqlx::query_as::<_, CustomerProfile>(&query)
            .fetch_all(pool)
            .await
    }
}
