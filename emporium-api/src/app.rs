/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use emporium_api::{app::AppState, config::Config};
/// use emporium_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.database.clone()).await?;
/// let state = AppState::new(pool, config);
/// let app = emporium_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{auth::token_auth_layer, error_detail::expose_error_detail, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use emporium_shared::auth::token::AUTH_TOKEN_HEADER;
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Base URL of simulated payment links
    pub fn payment_base_url(&self) -> &str {
        &self.config.payment.base_url
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// GET  /                                   welcome banner
/// /api
/// ├── GET  /healthcheck
/// ├── /auth        register, login, admin/register (public); me, logout
/// ├── /products    GET public; POST, PUT, DELETE staff
/// ├── /categories  GET public; POST staff
/// ├── /warehouses  GET public; POST, PUT, stock intake staff
/// ├── /suppliers   authenticated
/// ├── /cart        customers
/// ├── /orders      authenticated
/// ├── /payments    authenticated
/// ├── /admin       staff
/// └── /users       staff
/// ```
///
/// Routes that need a principal sit behind [`token_auth_layer`]; role checks
/// happen in the handlers.
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, compression,
/// then (development only) internal error detail.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/logout", post(routes::auth::logout))
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/admin/register", post(routes::auth::admin_register));

    let product_routes = Router::new()
        .route("/", post(routes::products::create_product))
        .route(
            "/:id",
            put(routes::products::update_product).delete(routes::products::delete_product),
        )
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer))
        .route("/", get(routes::products::list_products))
        .route("/:id", get(routes::products::get_product));

    let category_routes = Router::new()
        .route("/", post(routes::categories::create_category))
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer))
        .route("/", get(routes::categories::list_categories));

    let warehouse_routes = Router::new()
        .route("/", post(routes::warehouses::create_warehouse))
        .route("/:id", put(routes::warehouses::update_warehouse))
        .route("/:id/stock/:product_id", post(routes::warehouses::add_stock))
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer))
        .route("/", get(routes::warehouses::list_warehouses))
        .route("/:id", get(routes::warehouses::get_warehouse))
        .route("/:id/stock", get(routes::warehouses::list_stock));

    let supplier_routes = Router::new()
        .route(
            "/",
            get(routes::suppliers::list_suppliers).post(routes::suppliers::create_supplier),
        )
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer));

    let cart_routes = Router::new()
        .route("/", get(routes::cart::get_cart).post(routes::cart::update_cart))
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer));

    let order_routes = Router::new()
        .route("/", post(routes::orders::create_order).get(routes::orders::list_orders))
        .route("/all", get(routes::orders::list_all_orders))
        .route("/:id", get(routes::orders::get_order))
        .route("/:id/status", put(routes::orders::update_order_status))
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer));

    let payment_routes = Router::new()
        .route("/create", post(routes::payments::create_payment))
        .route("/verify", post(routes::payments::verify_payment))
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer));

    let admin_routes = Router::new()
        .route("/customers", get(routes::admin::list_customers))
        .route("/employees", get(routes::admin::list_employees))
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer));

    let user_routes = Router::new()
        .route("/:id", get(routes::admin::get_user))
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer));

    let api_routes = Router::new()
        .route("/healthcheck", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .nest("/products", product_routes)
        .nest("/categories", category_routes)
        .nest("/warehouses", warehouse_routes)
        .nest("/suppliers", supplier_routes)
        .nest("/cart", cart_routes)
        .nest("/orders", order_routes)
        .nest("/payments", payment_routes)
        .nest("/admin", admin_routes)
        .nest("/users", user_routes);

    let mut router = Router::new()
        .route("/", get(routes::health::welcome))
        .nest("/api", api_routes)
        .fallback(route_not_found);

    if state.config.is_development() {
        router = router.layer(from_fn(expose_error_detail));
    }

    router
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri(),
                        principal = tracing::field::Empty
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(!state.config.is_development()))
        .with_state(state)
}

/// CORS policy from configured origins; `*` is permissive
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(AUTH_TOKEN_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::Service as _;

    fn lazy_app(config: Config) -> Router {
        let pool = PgPool::connect_lazy(&config.database.url).unwrap();
        build_router(AppState::new(pool, config))
    }

    async fn send_get(app: &mut Router, uri: &str) -> axum::response::Response {
        app.call(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_route_is_enveloped_404() {
        let mut app = lazy_app(Config::for_database("postgresql://localhost:1/unused"));

        let response = send_get(&mut app, "/api/nope").await;
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Route not found");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_welcome_banner() {
        let mut app = lazy_app(Config::for_database("postgresql://localhost:1/unused"));

        let response = send_get(&mut app, "/").await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert!(response.headers().get(header::X_CONTENT_TYPE_OPTIONS).is_some());
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let mut app = lazy_app(Config::for_database("postgresql://localhost:1/unused"));

        for uri in ["/api/cart", "/api/orders", "/api/auth/me", "/api/admin/customers"] {
            let response = send_get(&mut app, uri).await;
            assert_eq!(
                response.status(),
                axum::http::StatusCode::UNAUTHORIZED,
                "{uri} should require a token"
            );
        }
    }

    #[test]
    fn test_cors_layer_builds_for_lists_and_wildcard() {
        let mut config = Config::for_database("postgresql://localhost:1/unused");
        let _ = cors_layer(&config);

        config.api.cors_origins = vec!["*".to_string()];
        let _ = cors_layer(&config);
    }
}
