/// Warehouse and stock endpoints
///
/// # Endpoints
///
/// - `GET /api/warehouses` - List warehouses (public)
/// - `GET /api/warehouses/:id` - One warehouse (public)
/// - `GET /api/warehouses/:id/stock` - Stock held in a warehouse (public)
/// - `POST /api/warehouses` - Create (Admin, OfficeStaff)
/// - `PUT /api/warehouses/:id` - Update (Admin, OfficeStaff)
/// - `POST /api/warehouses/:id/stock/:product_id` - Stock intake (staff)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{trimmed, ApiPath, ValidatedJson},
    response::ApiResponse,
};
use axum::{extract::State, Extension};
use emporium_shared::{
    auth::{
        authorization::{require_role, CATALOG_ROLES, STAFF_ROLES},
        principal::Principal,
    },
    models::{
        product::Product,
        warehouse::{Stock, StockLine, Warehouse, WarehouseInput},
    },
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct WarehouseRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    pub location: Option<String>,
}

impl From<WarehouseRequest> for WarehouseInput {
    fn from(req: WarehouseRequest) -> Self {
        WarehouseInput {
            name: req.name,
            location: req.location,
        }
    }
}

/// Stock intake body
#[derive(Debug, Deserialize, Validate)]
pub struct StockRequest {
    #[validate(range(min = 1, max = 1000000, message = "Quantity must be 1 to 1000000"))]
    pub quantity: i32,
}

async fn find_warehouse(pool: &PgPool, id: Uuid) -> ApiResult<Warehouse> {
    Warehouse::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Warehouse not found".to_string()))
}

pub async fn list_warehouses(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<Vec<Warehouse>>> {
    let warehouses = Warehouse::list(&state.db).await?;
    Ok(ApiResponse::ok("Warehouses fetched successfully", warehouses))
}

pub async fn get_warehouse(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Warehouse>> {
    let warehouse = find_warehouse(&state.db, id).await?;
    Ok(ApiResponse::ok("Warehouse fetched successfully", warehouse))
}

pub async fn list_stock(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Vec<StockLine>>> {
    find_warehouse(&state.db, id).await?;

    let stock = Warehouse::stock(&state.db, id).await?;
    Ok(ApiResponse::ok("Stock fetched successfully", stock))
}

pub async fn create_warehouse(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(req): ValidatedJson<WarehouseRequest>,
) -> ApiResult<ApiResponse<Warehouse>> {
    require_role(&principal, CATALOG_ROLES)?;

    let warehouse = Warehouse::create(&state.db, req.into()).await?;

    info!(warehouse_id = %warehouse.id, "Warehouse created");

    Ok(ApiResponse::created("Warehouse created successfully", warehouse))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<WarehouseRequest>,
) -> ApiResult<ApiResponse<Warehouse>> {
    require_role(&principal, CATALOG_ROLES)?;

    let warehouse = Warehouse::update(&state.db, id, req.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Warehouse not found".to_string()))?;

    Ok(ApiResponse::ok("Warehouse updated successfully", warehouse))
}

/// Add units of a product to a warehouse
///
/// Quantities accumulate: two intakes of 5 and 3 leave 8 on hand.
///
/// # Endpoint
///
/// ```text
/// POST /api/warehouses/:id/stock/:product_id
/// auth-token: <token>
///
/// { "quantity": 5 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Quantity below 1 or above 1000000
/// - `403 Forbidden`: Caller is not staff
/// - `404 Not Found`: Unknown warehouse or product
pub async fn add_stock(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath((id, product_id)): ApiPath<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<StockRequest>,
) -> ApiResult<ApiResponse<Stock>> {
    require_role(&principal, STAFF_ROLES)?;

    find_warehouse(&state.db, id).await?;
    if !Product::exists(&state.db, product_id).await? {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    let stock = Warehouse::add_stock(&state.db, id, product_id, req.quantity).await?;

    info!(
        warehouse_id = %id,
        product_id = %product_id,
        added = req.quantity,
        on_hand = stock.quantity,
        "Stock received"
    );

    Ok(ApiResponse::ok("Stock updated successfully", stock))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_quantity_must_be_positive() {
        assert!(StockRequest { quantity: 1 }.validate().is_ok());
        assert!(StockRequest { quantity: 0 }.validate().is_err());
        assert!(StockRequest { quantity: -4 }.validate().is_err());
        assert!(StockRequest { quantity: 1_000_000 }.validate().is_ok());
        assert!(StockRequest { quantity: i32::MAX }.validate().is_err());
    }

    #[test]
    fn test_warehouse_name_is_trimmed() {
        let req: WarehouseRequest = serde_json::from_str(r#"{"name":"  North Dock "}"#).unwrap();
        assert!(req.validate().is_ok());

        let input: WarehouseInput = req.into();
        assert_eq!(input.name, "North Dock");
    }

    #[test]
    fn test_blank_warehouse_name_is_rejected() {
        let req: WarehouseRequest = serde_json::from_str(r#"{"name":"   "}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
