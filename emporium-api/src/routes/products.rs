/// Product catalog endpoints
///
/// # Endpoints
///
/// - `GET /api/products?q=&categoryId=` - Search the catalog (public)
/// - `GET /api/products/:id` - One product (public)
/// - `POST /api/products` - Create (Admin, OfficeStaff)
/// - `PUT /api/products/:id` - Full update (Admin, OfficeStaff)
/// - `DELETE /api/products/:id` - Delete (Admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{trimmed, ApiPath, ApiQuery, ValidatedJson},
    response::ApiResponse,
};
use axum::{extract::State, Extension};
use emporium_shared::{
    auth::{
        authorization::{require_role, ADMIN_ROLES, CATALOG_ROLES},
        principal::Principal,
    },
    models::{
        category::Category,
        product::{Product, ProductFilter, ProductInput},
    },
};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Free-text search over name and description
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
}

/// Create and update body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    pub description: Option<String>,

    pub price: Option<Decimal>,

    pub category_id: Option<Uuid>,

    #[validate(length(max = 1024, message = "Image URL must be at most 1024 characters"))]
    pub image: Option<String>,
}

/// Highest unit price accepted, so a cart line of 1000 units still fits the
/// order amount column
pub const MAX_PRICE: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// Rounds a price to cents after checking its range
fn check_price(price: Option<Decimal>) -> ApiResult<Decimal> {
    let price = price.ok_or_else(|| ApiError::invalid_field("price", "Price is required"))?;

    if price < Decimal::ZERO {
        return Err(ApiError::invalid_field("price", "Price must not be negative"));
    }
    if price > MAX_PRICE {
        return Err(ApiError::invalid_field("price", "Price must be at most 999999.99"));
    }

    Ok(price.round_dp(2))
}

impl ProductRequest {
    /// Checks what `validator` cannot express and resolves the category
    async fn into_input(self, pool: &PgPool) -> ApiResult<ProductInput> {
        let price = check_price(self.price)?;

        if let Some(category_id) = self.category_id {
            if !Category::exists(pool, category_id).await? {
                return Err(ApiError::invalid_field("categoryId", "Category does not exist"));
            }
        }

        Ok(ProductInput {
            name: self.name,
            description: self.description,
            price,
            category_id: self.category_id,
            image: self.image,
        })
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<ApiResponse<Vec<Product>>> {
    let products = Product::search(
        &state.db,
        &ProductFilter {
            query: query.q,
            category_id: query.category_id,
        },
    )
    .await?;

    Ok(ApiResponse::ok("Products fetched successfully", products))
}

pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Product>> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(ApiResponse::ok("Product fetched successfully", product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> ApiResult<ApiResponse<Product>> {
    require_role(&principal, CATALOG_ROLES)?;

    let input = req.into_input(&state.db).await?;
    let product = Product::create(&state.db, input).await?;

    info!(product_id = %product.id, by = %principal.id(), "Product created");

    Ok(ApiResponse::created("Product created successfully", product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> ApiResult<ApiResponse<Product>> {
    require_role(&principal, CATALOG_ROLES)?;

    let input = req.into_input(&state.db).await?;
    let product = Product::update(&state.db, id, input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    info!(product_id = %product.id, by = %principal.id(), "Product updated");

    Ok(ApiResponse::ok("Product updated successfully", product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    require_role(&principal, ADMIN_ROLES)?;

    if !Product::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    info!(product_id = %id, by = %principal.id(), "Product deleted");

    Ok(ApiResponse::ok("Product deleted successfully", ()))
}
