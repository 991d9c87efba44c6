//! Resolving a session token to the account that owns it
//!
//! A token digest lives in one of three tables. Resolution checks all three in
//! a single query; when (against the odds) more than one account holds the
//! same digest, customers win over suppliers and suppliers over employees, and
//! the collision is logged.

use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::token::hash_token;
use crate::models::{customer::Customer, employee::Employee, employee::EmployeeRole, supplier::Supplier};

/// The authenticated account behind a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Principal {
    Customer { id: Uuid },
    Supplier { id: Uuid },
    Employee { id: Uuid, role: EmployeeRole },
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::Customer { id }
            | Principal::Supplier { id }
            | Principal::Employee { id, .. } => *id,
        }
    }

    /// Role name shown to clients: `Customer`, `Supplier` or the staff role
    pub fn role_name(&self) -> &'static str {
        match self {
            Principal::Customer { .. } => "Customer",
            Principal::Supplier { .. } => "Supplier",
            Principal::Employee { role, .. } => role.as_str(),
        }
    }

    /// Staff role, or `None` for customers and suppliers
    pub fn employee_role(&self) -> Option<EmployeeRole> {
        match self {
            Principal::Employee { role, .. } => Some(*role),
            _ => None,
        }
    }

    pub fn is_customer(&self) -> bool {
        matches!(self, Principal::Customer { .. })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TokenOwner {
    kind: String,
    id: Uuid,
    role: Option<EmployeeRole>,
}

impl TokenOwner {
    fn into_principal(self) -> Option<Principal> {
        match (self.kind.as_str(), self.role) {
            ("customer", _) => Some(Principal::Customer { id: self.id }),
            ("supplier", _) => Some(Principal::Supplier { id: self.id }),
            ("employee", Some(role)) => Some(Principal::Employee { id: self.id, role }),
            _ => None,
        }
    }
}

/// Looks up the account holding `token`
///
/// Returns `None` if no account holds it (never issued, or logged out).
pub async fn resolve(pool: &PgPool, token: &str) -> Result<Option<Principal>, sqlx::Error> {
    let digest = hash_token(token);

    let owners = sqlx::query_as::<_, TokenOwner>(
        r#"
        SELECT kind, id, role FROM (
            SELECT 1 AS precedence, 'customer' AS kind, id, NULL::employee_role AS role
            FROM customers WHERE auth_token_hash = $1
            UNION ALL
            SELECT 2, 'supplier', id, NULL::employee_role
            FROM suppliers WHERE auth_token_hash = $1
            UNION ALL
            SELECT 3, 'employee', id, role
            FROM employees WHERE auth_token_hash = $1
        ) owners
        ORDER BY precedence
        "#,
    )
    .bind(&digest)
    .fetch_all(pool)
    .await?;

    if owners.len() > 1 {
        warn!(
            matches = owners.len(),
            "Session token digest held by more than one account; using highest precedence"
        );
    }

    Ok(owners.into_iter().next().and_then(TokenOwner::into_principal))
}

/// Whether any customer, supplier or employee already logs in with `email`
///
/// Login stops at the first table holding an email, so it must be unique
/// across all three. The `account_emails` table enforces the same rule for
/// concurrent inserts.
pub async fn email_in_use(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM account_emails WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

/// Clears the principal's stored token so it no longer authenticates
pub async fn revoke(pool: &PgPool, principal: &Principal) -> Result<bool, sqlx::Error> {
    match principal {
        Principal::Customer { id } => Customer::set_token_hash(pool, *id, None).await,
        Principal::Supplier { id } => Supplier::set_token_hash(pool, *id, None).await,
        Principal::Employee { id, .. } => Employee::set_token_hash(pool, *id, None).await,
    }
}

/// Stores the digest of a freshly issued token on the principal's row
pub async fn store_token_hash(
    pool: &PgPool,
    principal: &Principal,
    digest: &str,
) -> Result<bool, sqlx::Error> {
    match principal {
        Principal::Customer { id } => Customer::set_token_hash(pool, *id, Some(digest)).await,
        Principal::Supplier { id } => Supplier::set_token_hash(pool, *id, Some(digest)).await,
        Principal::Employee { id, .. } => Employee::set_token_hash(pool, *id, Some(digest)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        let id = Uuid::new_v4();

        assert_eq!(Principal::Customer { id }.role_name(), "Customer");
        assert_eq!(Principal::Supplier { id }.role_name(), "Supplier");
        assert_eq!(
            Principal::Employee { id, role: EmployeeRole::DeliveryStaff }.role_name(),
            "DeliveryStaff"
        );
    }

    #[test]
    fn test_employee_role_only_for_staff() {
        let id = Uuid::new_v4();

        assert_eq!(Principal::Customer { id }.employee_role(), None);
        assert_eq!(
            Principal::Employee { id, role: EmployeeRole::Admin }.employee_role(),
            Some(EmployeeRole::Admin)
        );
        assert_eq!(Principal::Employee { id, role: EmployeeRole::Admin }.id(), id);
    }

    #[test]
    fn test_owner_without_role_is_not_an_employee() {
        let owner = TokenOwner {
            kind: "employee".to_string(),
            id: Uuid::new_v4(),
            role: None,
        };

        assert!(owner.into_principal().is_none());
    }

    #[test]
    fn test_principal_serialization() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(Principal::Employee { id, role: EmployeeRole::OfficeStaff })
            .unwrap();

        assert_eq!(json["kind"], "employee");
        assert_eq!(json["role"], "OfficeStaff");
    }
}
