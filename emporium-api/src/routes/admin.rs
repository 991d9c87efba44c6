/// Back-office listings
///
/// - `GET /api/admin/customers` - Customers (Admin, OfficeStaff)
/// - `GET /api/admin/employees` - Employees (Admin)
/// - `GET /api/users/:id` - One customer profile (Admin, OfficeStaff)
///
/// Password and token hashes never leave the database layer here.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiPath,
    response::ApiResponse,
};
use axum::{extract::State, Extension};
use emporium_shared::{
    auth::{
        authorization::{require_role, ADMIN_ROLES, CATALOG_ROLES},
        principal::Principal,
    },
    models::{
        customer::{Customer, CustomerProfile},
        employee::{Employee, EmployeeSummary},
    },
};
use uuid::Uuid;

pub async fn list_customers(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<ApiResponse<Vec<CustomerProfile>>> {
    require_role(&principal, CATALOG_ROLES)?;

    let customers = Customer::list(&state.db).await?;
    Ok(ApiResponse::ok("Customers fetched successfully", customers))
}

pub async fn list_employees(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<ApiResponse<Vec<EmployeeSummary>>> {
    require_role(&principal, ADMIN_ROLES)?;

    let employees = Employee::list(&state.db).await?;
    Ok(ApiResponse::ok("Employees fetched successfully", employees))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<CustomerProfile>> {
    require_role(&principal, CATALOG_ROLES)?;

    let profile = Customer::profile(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok("User fetched successfully", profile))
}
