/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a customer and receive a token
/// - `POST /api/auth/login` - Log in as customer, employee or supplier
/// - `GET /api/auth/me` - Profile of the caller
/// - `POST /api/auth/logout` - Revoke the caller's token
/// - `POST /api/auth/admin/register` - Create a staff account
///
/// Tokens are sent back in the `auth-token` header on later requests. Each
/// login replaces the account's previous token.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{trimmed, ValidatedJson},
    response::ApiResponse,
};
use axum::{extract::State, http::HeaderMap, Extension};
use chrono::{DateTime, NaiveDate, Utc};
use emporium_shared::{
    auth::{
        authorization::{require_role, ADMIN_ROLES},
        middleware::authenticate,
        password,
        principal::{self, Principal},
        token::SessionToken,
    },
    models::{
        customer::{CreateCustomer, Customer},
        employee::{CreateEmployee, Employee, EmployeeRole, EmployeeSummary},
        supplier::Supplier,
    },
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 32, message = "Contact number must be at most 32 characters"))]
    pub contact_number: Option<String>,

    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub token: String,
    pub customer_id: Uuid,
    pub name: String,
    pub email: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub user_id: Uuid,
    pub role: &'static str,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// Profile returned by `/me`; fields that do not apply to the caller are null
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub designation: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Staff registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegisterRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,

    #[validate(length(max = 255, message = "Designation must be at most 255 characters"))]
    pub designation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminRegisterResponse {
    pub token: String,
    pub user: EmployeeSummary,
}

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Rejects an email already used by any customer, supplier or employee
///
/// Login stops at the first table holding an email, so a duplicate in a
/// later table could never log in.
pub(crate) async fn ensure_email_available(pool: &PgPool, email: &str) -> ApiResult<()> {
    if principal::email_in_use(pool, email).await? {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }
    Ok(())
}

pub(crate) fn check_password_strength(candidate: &str) -> ApiResult<()> {
    password::validate_password_strength(candidate)
        .map_err(|message| ApiError::invalid_field("password", message))
}

/// Mints a token, stores its digest on the principal's row, returns the plaintext
async fn issue_token(pool: &PgPool, principal: &Principal) -> ApiResult<String> {
    let token = SessionToken::generate();

    let stored = principal::store_token_hash(pool, principal, &token.hash()).await?;
    if !stored {
        return Err(ApiError::InternalError(format!(
            "Account {} vanished while logging in",
            principal.id()
        )));
    }

    Ok(token.into_string())
}

/// Checks a password; a mismatch is a 401
fn check_password(candidate: &str, hash: &str) -> ApiResult<()> {
    if password::verify_password(candidate, hash)? {
        Ok(())
    } else {
        Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))
    }
}

/// Register a new customer
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "password": "engine1843",
///   "contactNumber": "+44 20 7946 0000",
///   "address": "12 Analytical Row"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<ApiResponse<RegisterResponse>> {
    check_password_strength(&req.password)?;

    let email = normalize_email(&req.email);
    ensure_email_available(&state.db, &email).await?;

    let password_hash = password::hash_password(&req.password)?;
    let token = SessionToken::generate();

    let customer = Customer::create(
        &state.db,
        CreateCustomer {
            name: req.name,
            email,
            password_hash,
            contact_number: req.contact_number,
            address: req.address,
            auth_token_hash: Some(token.hash()),
        },
    )
    .await?;

    info!(customer_id = %customer.id, "Customer registered");

    Ok(ApiResponse::created(
        "Customer registered successfully",
        RegisterResponse {
            token: token.into_string(),
            customer_id: customer.id,
            name: customer.name,
            email: customer.email,
        },
    ))
}

/// Login endpoint
///
/// Looks the email up among customers, then employees, then suppliers. The
/// first table holding the email decides: a wrong password there is a 401
/// even if another table has the same email.
///
/// # Errors
///
/// - `400 Bad Request`: Missing email or password
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    let email = normalize_email(&req.email);

    let (principal, email) = if let Some(customer) = Customer::find_by_email(&state.db, &email).await? {
        check_password(&req.password, &customer.password_hash)?;
        (Principal::Customer { id: customer.id }, customer.email)
    } else if let Some(employee) = Employee::find_by_email(&state.db, &email).await? {
        check_password(&req.password, &employee.password_hash)?;
        (
            Principal::Employee {
                id: employee.id,
                role: employee.role,
            },
            employee.email,
        )
    } else if let Some(supplier) = Supplier::find_by_email(&state.db, &email).await? {
        check_password(&req.password, &supplier.password_hash)?;
        (Principal::Supplier { id: supplier.id }, supplier.contact_email)
    } else {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let token = issue_token(&state.db, &principal).await?;

    info!(user_id = %principal.id(), role = principal.role_name(), "Login succeeded");

    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            token,
            user: LoginUser {
                user_id: principal.id(),
                role: principal.role_name(),
                email,
            },
        },
    ))
}

/// Profile of the authenticated caller
pub async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<ApiResponse<MeResponse>> {
    let profile = match principal {
        Principal::Customer { id } => Customer::find_by_id(&state.db, id).await?.map(|c| MeResponse {
            user_id: c.id,
            name: c.name,
            email: c.email,
            role: principal.role_name(),
            contact_number: c.contact_number,
            address: c.address,
            designation: None,
            joining_date: None,
            created_at: c.created_at,
        }),
        Principal::Employee { id, .. } => Employee::find_by_id(&state.db, id).await?.map(|e| MeResponse {
            user_id: e.id,
            name: e.name,
            email: e.email,
            role: principal.role_name(),
            contact_number: None,
            address: None,
            designation: e.designation,
            joining_date: Some(e.joining_date),
            created_at: e.created_at,
        }),
        Principal::Supplier { id } => Supplier::find_by_id(&state.db, id).await?.map(|s| MeResponse {
            user_id: s.id,
            name: s.name,
            email: s.contact_email,
            role: principal.role_name(),
            contact_number: None,
            address: s.address,
            designation: None,
            joining_date: None,
            created_at: s.created_at,
        }),
    };

    let profile = profile.ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok("User profile fetched", profile))
}

/// Revokes the caller's token
pub async fn logout(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<ApiResponse<()>> {
    principal::revoke(&state.db, &principal).await?;

    info!(user_id = %principal.id(), role = principal.role_name(), "Logged out");

    Ok(ApiResponse::ok("Logged out successfully", ()))
}

/// Create a staff account
///
/// Requires an Admin token, except while no Admin exists yet: the first
/// Admin of a fresh installation is created without credentials.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown role
/// - `401 Unauthorized` / `403 Forbidden`: Caller is not an Admin
/// - `409 Conflict`: Email already registered
pub async fn admin_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<AdminRegisterRequest>,
) -> ApiResult<ApiResponse<AdminRegisterResponse>> {
    if Employee::exists_with_role(&state.db, EmployeeRole::Admin).await? {
        let caller = authenticate(&state.db, &headers).await?;
        require_role(&caller, ADMIN_ROLES)?;
    } else {
        warn!("No Admin exists; accepting unauthenticated staff registration");
    }

    let role: EmployeeRole = req
        .role
        .parse()
        .map_err(|e: emporium_shared::models::employee::UnknownRole| {
            ApiError::invalid_field("role", e.to_string())
        })?;

    check_password_strength(&req.password)?;

    let email = normalize_email(&req.email);
    ensure_email_available(&state.db, &email).await?;

    let password_hash = password::hash_password(&req.password)?;
    let token = SessionToken::generate();

    let employee = Employee::create(
        &state.db,
        CreateEmployee {
            name: req.name,
            email,
            password_hash,
            role,
            designation: req.designation,
            auth_token_hash: Some(token.hash()),
        },
    )
    .await?;

    info!(employee_id = %employee.id, role = %employee.role, "Employee registered");

    Ok(ApiResponse::created(
        "Employee registered successfully",
        AdminRegisterResponse {
            token: token.into_string(),
            user: employee.summary(),
        },
    ))
}
