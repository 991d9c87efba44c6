/// Simulated payment flow
///
/// - `POST /api/payments/create` - Payment link for one of the caller's orders
/// - `POST /api/payments/verify` - Record the gateway's verdict
///
/// No gateway is contacted. The link points at the configured base URL and
/// verification trusts the status it is given.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    response::ApiResponse,
    routes::orders::{require_order_owner, visible_order},
};
use axum::{extract::State, Extension};
use chrono::Utc;
use emporium_shared::{
    auth::{authorization::require_owner_or_staff, principal::Principal},
    models::order::{Order, STATUS_FAILED, STATUS_PAID},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Gateway statuses that count as a successful payment
const SUCCESS_STATUSES: [&str; 2] = ["success", "completed"];

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLink {
    pub payment_url: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: Uuid,

    #[serde(default)]
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// `{base}/pay/{order_id}?token={millis}`
pub fn payment_url(base_url: &str, order_id: Uuid, issued_at_millis: i64) -> String {
    format!(
        "{}/pay/{}?token={}",
        base_url.trim_end_matches('/'),
        order_id,
        issued_at_millis
    )
}

pub fn is_successful(status: &str) -> bool {
    SUCCESS_STATUSES.contains(&status.trim().to_ascii_lowercase().as_str())
}

/// Create a payment link
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the customer who placed the order
/// - `404 Not Found`: Unknown order
pub async fn create_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(req): ValidatedJson<CreatePaymentRequest>,
) -> ApiResult<ApiResponse<PaymentLink>> {
    let order = visible_order(&state.db, &principal, req.order_id).await?;
    require_order_owner(&principal, &order)?;

    let link = PaymentLink {
        payment_url: payment_url(
            state.payment_base_url(),
            order.id,
            Utc::now().timestamp_millis(),
        ),
    };

    info!(order_id = %order.id, "Payment link issued");

    Ok(ApiResponse::ok("Payment link created successfully", link))
}

/// Verify a payment
///
/// `success` or `completed` marks the order paid. Any other status marks it
/// failed and the call answers 400.
///
/// # Errors
///
/// - `400 Bad Request`: Payment failed
/// - `403 Forbidden`: Caller is neither the owner nor staff
/// - `404 Not Found`: Unknown order
pub async fn verify_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(req): ValidatedJson<VerifyPaymentRequest>,
) -> ApiResult<ApiResponse<Order>> {
    let order = Order::find_by_id(&state.db, req.order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;
    require_owner_or_staff(&principal, order.customer_id)?;

    if !is_successful(&req.status) {
        Order::update_status(&state.db, order.id, STATUS_FAILED).await?;
        warn!(order_id = %order.id, status = %req.status, "Payment failed");
        return Err(ApiError::BadRequest("Payment failed".to_string()));
    }

    let paid = Order::update_status(&state.db, order.id, STATUS_PAID)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    info!(order_id = %paid.id, amount = %paid.total_amount, "Payment verified");

    Ok(ApiResponse::ok("Payment verified successfully", paid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_url_format() {
        let id = Uuid::nil();
        assert_eq!(
            payment_url("http://localhost:5173/", id, 1_700_000_000_000),
            "http://localhost:5173/pay/00000000-0000-0000-0000-000000000000?token=1700000000000"
        );
    }

    #[test]
    fn test_successful_statuses() {
        assert!(is_successful("success"));
        assert!(is_successful("Completed"));
        assert!(!is_successful("declined"));
        assert!(!is_successful(""));
    }
}
