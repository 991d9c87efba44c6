//! Success envelope
//!
//! ```json
//! {
//!   "success": true,
//!   "status_code": 200,
//!   "message": "Products fetched",
//!   "data": [...],
//!   "errors": []
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ValidationErrorDetail;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub data: T,
    pub errors: Vec<ValidationErrorDetail>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            status_code: status.as_u16(),
            message: message.into(),
            data,
            errors: Vec::new(),
        }
    }

    /// 200 OK
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, data)
    }

    /// 201 Created
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, data)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
