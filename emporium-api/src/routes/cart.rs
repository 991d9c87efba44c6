/// Cart endpoints (customers only)
///
/// - `GET /api/cart` - Lines in the caller's cart with a subtotal
/// - `POST /api/cart` - Set the quantity of one product

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    response::ApiResponse,
};
use axum::{extract::State, Extension};
use emporium_shared::{
    auth::{authorization::require_customer, principal::Principal},
    models::{
        cart::{self, Cart, CartChange, CartLine},
        product::Product,
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// `None` until the first item is added
    pub cart_id: Option<Uuid>,
    pub items: Vec<CartLine>,
    pub subtotal: Decimal,
}

/// Cart update body
///
/// A quantity of zero or below removes the product from the cart.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdateRequest {
    pub product_id: Uuid,
    #[validate(range(max = 1000, message = "Quantity must be at most 1000"))]
    pub quantity: i32,
}

pub async fn get_cart(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<ApiResponse<CartView>> {
    let customer_id = require_customer(&principal)?;

    let view = match Cart::find_by_customer(&state.db, customer_id).await? {
        Some(found) => {
            let items = Cart::lines(&state.db, found.id).await?;
            CartView {
                cart_id: Some(found.id),
                subtotal: cart::subtotal(&items),
                items,
            }
        }
        None => CartView {
            cart_id: None,
            items: Vec::new(),
            subtotal: Decimal::ZERO,
        },
    };

    Ok(ApiResponse::ok("Cart fetched successfully", view))
}

/// Set a product's quantity in the caller's cart
///
/// # Endpoint
///
/// ```text
/// POST /api/cart
/// auth-token: <token>
///
/// { "productId": "…", "quantity": 2 }
/// ```
///
/// Repeating the same call leaves the cart unchanged.
///
/// # Errors
///
/// - `400 Bad Request`: Quantity above 1000
/// - `403 Forbidden`: Caller is not a customer
/// - `404 Not Found`: Unknown product
pub async fn update_cart(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(req): ValidatedJson<CartUpdateRequest>,
) -> ApiResult<ApiResponse<CartChange>> {
    let customer_id = require_customer(&principal)?;

    if !Product::exists(&state.db, req.product_id).await? {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    let cart = Cart::get_or_create(&state.db, customer_id).await?;
    let change = Cart::set_item_quantity(&state.db, cart.id, req.product_id, req.quantity).await?;

    debug!(
        customer_id = %customer_id,
        product_id = %req.product_id,
        change = ?change,
        "Cart updated"
    );

    Ok(ApiResponse::ok("Cart updated successfully", change))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_field_names() {
        let id = Uuid::new_v4();
        let req: CartUpdateRequest =
            serde_json::from_value(serde_json::json!({ "productId": id, "quantity": 0 }))
                .unwrap();

        assert_eq!(req.product_id, id);
        assert_eq!(req.quantity, 0);
    }

    #[test]
    fn test_quantity_upper_bound() {
        let request = |quantity| CartUpdateRequest {
            product_id: Uuid::new_v4(),
            quantity,
        };

        assert!(request(1000).validate().is_ok());
        assert!(request(0).validate().is_ok());
        assert!(request(-3).validate().is_ok());
        assert!(request(1001).validate().is_err());
        assert!(request(i32::MAX).validate().is_err());
    }

    #[test]
    fn test_empty_view_serializes_empty_items() {
        let view = CartView {
            cart_id: None,
            items: Vec::new(),
            subtotal: Decimal::ZERO,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["items"], serde_json::json!([]));
        assert!(json["cartId"].is_null());
    }
}
