/// Role checks for authenticated requests
///
/// Access is decided from the [`Principal`] alone; no extra query is needed
/// because the staff role travels with it.
///
/// # Role groups
///
/// - [`CATALOG_ROLES`]: Admin, OfficeStaff. Products, categories, warehouses
/// - [`STAFF_ROLES`]: every employee role. Order listing and status, stock intake
/// - [`ADMIN_ROLES`]: Admin. Staff and supplier accounts
///
/// # Example
///
/// ```
/// use emporium_shared::auth::authorization::{require_role, CATALOG_ROLES};
/// use emporium_shared::auth::principal::Principal;
/// use emporium_shared::models::employee::EmployeeRole;
/// use uuid::Uuid;
///
/// let clerk = Principal::Employee { id: Uuid::new_v4(), role: EmployeeRole::OfficeStaff };
/// assert!(require_role(&clerk, CATALOG_ROLES).is_ok());
///
/// let shopper = Principal::Customer { id: Uuid::new_v4() };
/// assert!(require_role(&shopper, CATALOG_ROLES).is_err());
/// ```

use uuid::Uuid;

use super::principal::Principal;
use crate::models::employee::EmployeeRole;

/// Roles that manage the catalog and warehouses
pub const CATALOG_ROLES: &[EmployeeRole] = &[EmployeeRole::Admin, EmployeeRole::OfficeStaff];

/// Every staff role
pub const STAFF_ROLES: &[EmployeeRole] = &[
    EmployeeRole::Admin,
    EmployeeRole::OfficeStaff,
    EmployeeRole::DeliveryStaff,
];

/// Roles that manage accounts
pub const ADMIN_ROLES: &[EmployeeRole] = &[EmployeeRole::Admin];

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Endpoint is for customers only
    #[error("Only customers can perform this action")]
    CustomerOnly,

    /// Principal's role is not in the allowed set
    #[error("Access denied for role {actual}")]
    InsufficientRole { actual: &'static str },

    /// Principal may not touch this resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Returns the customer id, or an error for any other principal
pub fn require_customer(principal: &Principal) -> Result<Uuid, AuthzError> {
    match principal {
        Principal::Customer { id } => Ok(*id),
        _ => Err(AuthzError::CustomerOnly),
    }
}

/// Passes if the principal is an employee whose role is in `allowed`
pub fn require_role(principal: &Principal, allowed: &[EmployeeRole]) -> Result<(), AuthzError> {
    match principal.employee_role() {
        Some(role) if allowed.contains(&role) => Ok(()),
        _ => Err(AuthzError::InsufficientRole {
            actual: principal.role_name(),
        }),
    }
}

/// Passes for the customer who owns a resource, or for any staff member
pub fn require_owner_or_staff(principal: &Principal, owner_id: Uuid) -> Result<(), AuthzError> {
    match principal {
        Principal::Customer { id } if *id == owner_id => Ok(()),
        Principal::Employee { .. } => Ok(()),
        _ => Err(AuthzError::NotAuthorized),
    }
}
