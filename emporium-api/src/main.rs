//! # Emporium API Server
//!
//! Serves the shop's REST API: opaque-token authentication for customers,
//! suppliers and staff, the product catalog, carts, orders and payments.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/emporium cargo run -p emporium-api
//! ```
//!
//! Set `LOG_FORMAT=json` for JSON log lines and `RUST_LOG` to override the
//! default filter.

use anyhow::Context;
use emporium_api::{
    app::{build_router, AppState},
    config::Config,
};
use emporium_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "emporium_api=debug,emporium_shared=debug,tower_http=debug";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.api.environment,
        "Emporium API server starting"
    );

    let pool = create_pool(config.database.clone())
        .await
        .context("Failed to connect to the database")?;

    if config.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
