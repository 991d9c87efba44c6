//! Employee model and database operations
//!
//! Employees are staff accounts. Their [`EmployeeRole`] decides which
//! back-office operations they may perform.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE employee_role AS ENUM ('Admin', 'OfficeStaff', 'DeliveryStaff');
//!
//! CREATE TABLE employees (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     email VARCHAR(255) NOT NULL UNIQUE,
//!     password_hash VARCHAR(255) NOT NULL,
//!     role employee_role NOT NULL,
//!     designation VARCHAR(255),
//!     joining_date DATE NOT NULL DEFAULT CURRENT_DATE,
//!     auth_token_hash CHAR(64),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Staff roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employee_role")]
pub enum EmployeeRole {
    /// Full control over catalog, staff and orders
    Admin,

    /// Catalog, warehouse and order handling
    OfficeStaff,

    /// Order status updates and stock intake
    DeliveryStaff,
}

impl EmployeeRole {
    /// Every role, in declaration order
    pub const ALL: [EmployeeRole; 3] = [
        EmployeeRole::Admin,
        EmployeeRole::OfficeStaff,
        EmployeeRole::DeliveryStaff,
    ];

    /// Name as stored in the database and shown to clients
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeRole::Admin => "Admin",
            EmployeeRole::OfficeStaff => "OfficeStaff",
            EmployeeRole::DeliveryStaff => "DeliveryStaff",
        }
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid role '{0}'. Must be Admin, OfficeStaff or DeliveryStaff")]
pub struct UnknownRole(pub String);

impl FromStr for EmployeeRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmployeeRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Employee row, including credentials
///
/// Never serialize this to clients; use [`EmployeeSummary`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: EmployeeRole,
    pub designation: Option<String>,
    pub joining_date: NaiveDate,
    pub auth_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public view of an employee
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: EmployeeRole,
    pub designation: Option<String>,
    pub joining_date: NaiveDate,
}

/// Input for creating an employee
#[derive(Debug, Clone)]
pub struct CreateEmployee {
    pub name: String,
    pub email: String,
    /// Argon2id hash, never the plaintext
    pub password_hash: String,
    pub role: EmployeeRole,
    pub designation: Option<String>,
    /// Digest of the session token issued on creation
    pub auth_token_hash: Option<String>,
}

const EMPLOYEE_COLUMNS: &str = "id, name, email, password_hash, role, designation, joining_date, auth_token_hash, created_at";

impl Employee {
    /// Inserts a new employee
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `employees_email_key` when the email
    /// is taken.
    pub async fn create(pool: &PgPool, data: CreateEmployee) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees (name, email, password_hash, role, designation, auth_token_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            EMPLOYEE_COLUMNS
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(data.name)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.role)
            .bind(data.designation)
            .bind(data.auth_token_hash)
            .fetch_one(pool)
            .await
    }

    /// Finds an employee by id
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM employees WHERE id = $1", EMPLOYEE_COLUMNS);

        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds an employee by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM employees WHERE email = $1", EMPLOYEE_COLUMNS);

        sqlx::query_as::<_, Employee>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Whether any employee holds `role`
    ///
    /// Used to allow the first Admin to be registered without credentials.
    pub async fn exists_with_role(pool: &PgPool, role: EmployeeRole) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM employees WHERE role = $1)")
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Replaces (or clears, with `None`) the stored session token digest
    pub async fn set_token_hash(
        pool: &PgPool,
        id: Uuid,
        token_hash: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE employees SET auth_token_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all employees without credentials
    pub async fn list(pool: &PgPool) -> Result<Vec<EmployeeSummary>, sqlx::Error> {
        sqlx::query_as::<_, EmployeeSummary>(
            r#"
            SELECT id, name, email, role, designation, joining_date
            FROM employees
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Drops credential columns
    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            designation: self.designation.clone(),
            joining_date: self.joining_date,
        }
    }
}
