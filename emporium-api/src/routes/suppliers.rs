/// Supplier endpoints
///
/// - `GET /api/suppliers` - List suppliers (any principal)
/// - `POST /api/suppliers` - Create a supplier account (Admin)
///
/// Suppliers log in through `POST /api/auth/login` like everyone else.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{trimmed, ValidatedJson},
    response::ApiResponse,
    routes::auth::{check_password_strength, ensure_email_available, normalize_email},
};
use axum::{extract::State, Extension};
use emporium_shared::{
    auth::{
        authorization::{require_role, ADMIN_ROLES},
        password,
        principal::Principal,
    },
    models::supplier::{CreateSupplier, Supplier, SupplierSummary},
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SupplierRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub address: Option<String>,
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
) -> ApiResult<ApiResponse<Vec<SupplierSummary>>> {
    let suppliers = Supplier::list(&state.db).await?;
    Ok(ApiResponse::ok("Suppliers fetched successfully", suppliers))
}

/// Create a supplier account
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or weak password
/// - `403 Forbidden`: Caller is not an Admin
/// - `409 Conflict`: Email already registered
pub async fn create_supplier(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(req): ValidatedJson<SupplierRequest>,
) -> ApiResult<ApiResponse<SupplierSummary>> {
    require_role(&principal, ADMIN_ROLES)?;
    check_password_strength(&req.password)?;

    let email = normalize_email(&req.email);
    ensure_email_available(&state.db, &email).await?;

    let password_hash = password::hash_password(&req.password)?;

    let supplier = Supplier::create(
        &state.db,
        CreateSupplier {
            name: req.name,
            contact_email: email,
            password_hash,
            address: req.address,
        },
    )
    .await?;

    info!(supplier_id = %supplier.id, by = %principal.id(), "Supplier created");

    Ok(ApiResponse::created("Supplier created successfully", supplier.summary()))
}
