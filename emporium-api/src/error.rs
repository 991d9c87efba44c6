/// Error handling for the API server
///
/// Handlers return `Result<T, ApiError>`; the error renders the failure
/// envelope with the matching HTTP status:
///
/// ```json
/// {
///   "success": false,
///   "status_code": 404,
///   "message": "Product not found",
///   "data": null,
///   "errors": []
/// }
/// ```
///
/// Internal errors hide their detail from clients. The detail is attached to
/// the response as an [`InternalErrorDetail`] extension, which the
/// development-only error detail middleware turns into a `stack` field.
///
/// # Example
///
/// ```
/// use emporium_api::error::{ApiError, ApiResult};
///
/// fn find(found: bool) -> ApiResult<&'static str> {
///     if !found {
///         return Err(ApiError::NotFound("Product not found".to_string()));
///     }
///     Ok("kettle")
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use emporium_shared::{
    auth::{authorization::AuthzError, middleware::AuthError, password::PasswordError},
    models::order::OrderError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Field-level validation failures (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub status_code: u16,
    pub message: String,

    /// Always `null` on failure
    pub data: Option<serde_json::Value>,

    pub errors: Vec<ValidationErrorDetail>,

    /// Internal error detail, development mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: status.as_u16(),
            message: message.into(),
            data: None,
            errors: Vec::new(),
            stack: None,
        }
    }
}

/// Hidden detail of a 500 response, carried in response extensions
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

const INTERNAL_MESSAGE: &str = "Internal server error";

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)])
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (body, detail) = match self {
            ApiError::ValidationError(errors) => {
                let mut body = ErrorResponse::new(status, "Validation failed");
                body.errors = errors;
                (body, None)
            }
            ApiError::InternalError(detail) => {
                tracing::error!(detail = %detail, "Internal error");
                (ErrorResponse::new(status, INTERNAL_MESSAGE), Some(detail))
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => (ErrorResponse::new(status, msg), None),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(InternalErrorDetail(detail));
        }
        response
    }
}

/// Postgres SQLSTATE for a value that does not fit its column
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    let constraint = db_err.constraint().unwrap_or_default();
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    if constraint.contains("name") {
                        return ApiError::Conflict("Name already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                if db_err.is_foreign_key_violation() {
                    return ApiError::BadRequest("Referenced record does not exist".to_string());
                }

                if db_err.is_check_violation()
                    || db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE)
                {
                    return ApiError::BadRequest("Value out of allowed range".to_string());
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert validator errors to field-level API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();

        errors.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(errors)
    }
}

/// Malformed or missing JSON bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Unparseable path parameters, such as a malformed UUID
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials | AuthError::InvalidToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::DatabaseError(e) => ApiError::from(e),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyCart | OrderError::TotalTooLarge => {
                ApiError::BadRequest(err.to_string())
            }
            OrderError::Database(e) => ApiError::from(e),
        }
    }
}
