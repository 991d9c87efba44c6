//! Exposes internal error detail in development
//!
//! [`ApiError::InternalError`](crate::error::ApiError::InternalError) renders
//! a generic 500 envelope and stashes its detail in the response extensions.
//! In development this layer rebuilds that envelope with a `stack` field so
//! the detail reaches the developer; in production it is never installed.

use axum::{extract::Request, middleware::Next, response::IntoResponse, response::Response, Json};

use crate::error::{ErrorResponse, InternalErrorDetail};

pub async fn expose_error_detail(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let Some(InternalErrorDetail(detail)) = response.extensions().get::<InternalErrorDetail>().cloned()
    else {
        return response;
    };

    let status = response.status();
    let mut body = ErrorResponse::new(status, "Internal server error");
    body.stack = Some(detail);

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::Service as _;

    async fn failing() -> Result<&'static str, ApiError> {
        Err(ApiError::InternalError("relation \"orders\" does not exist".to_string()))
    }

    async fn missing() -> Result<&'static str, ApiError> {
        Err(ApiError::NotFound("Order not found".to_string()))
    }

    async fn call(uri: &str) -> (StatusCode, serde_json::Value) {
        let mut app = Router::new()
            .route("/fail", get(failing))
            .route("/missing", get(missing))
            .layer(axum::middleware::from_fn(expose_error_detail));

        let response = app
            .call(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_error_gets_stack() {
        let (status, body) = call("/fail").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["stack"], "relation \"orders\" does not exist");
    }

    #[tokio::test]
    async fn test_client_errors_untouched() {
        let (status, body) = call("/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.get("stack").is_none());
    }
}
