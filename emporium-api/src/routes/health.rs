/// Health check and welcome banner
///
/// # Endpoints
///
/// ```text
/// GET /                  plain-text banner
/// GET /api/healthcheck   server and database status
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "status_code": 200,
///   "message": "Server is running",
///   "data": {
///     "status": "healthy",
///     "version": "0.1.0",
///     "database": "connected",
///     "pool": { "activeConnections": 1, "idleConnections": 1, "totalConnections": 2 }
///   },
///   "errors": []
/// }
/// ```

use crate::{app::AppState, response::ApiResponse};
use axum::extract::State;
use emporium_shared::db::pool::{get_pool_stats, health_check as ping_database, PoolStats};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the database is unreachable
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub pool: PoolStats,
}

/// Health check handler
///
/// Always answers 200 so load balancers can tell a running but degraded
/// server from a dead one.
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let database = match ping_database(&state.db).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    let status = if database == "connected" { "healthy" } else { "degraded" };

    ApiResponse::ok(
        "Server is running",
        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
            pool: get_pool_stats(&state.db),
        },
    )
}

pub async fn welcome() -> &'static str {
    "Welcome to the Emporium API"
}
