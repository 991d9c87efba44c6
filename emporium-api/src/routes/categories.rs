/// Category endpoints
///
/// - `GET /api/categories` - List categories (public)
/// - `POST /api/categories` - Create a category (Admin, OfficeStaff)

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{trimmed, ValidatedJson},
    response::ApiResponse,
};
use axum::{extract::State, Extension};
use emporium_shared::{
    auth::{
        authorization::{require_role, CATALOG_ROLES},
        principal::Principal,
    },
    models::category::{Category, CreateCategory},
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    pub description: Option<String>,
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<Vec<Category>>> {
    let categories = Category::list(&state.db).await?;
    Ok(ApiResponse::ok("Categories fetched successfully", categories))
}

/// Create a category
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not Admin or OfficeStaff
/// - `409 Conflict`: A category with this name exists
pub async fn create_category(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(req): ValidatedJson<CategoryRequest>,
) -> ApiResult<ApiResponse<Category>> {
    require_role(&principal, CATALOG_ROLES)?;

    let category = Category::create(
        &state.db,
        CreateCategory {
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    info!(category_id = %category.id, name = %category.name, "Category created");

    Ok(ApiResponse::created("Category created successfully", category))
}
