//! Embedded schema migrations
//!
//! SQL files live in the workspace-level `migrations/` directory and are
//! compiled into the binary with [`sqlx::migrate!`], so a deployed server can
//! bring an empty database up to date on start.

use sqlx::{migrate::MigrateDatabase, migrate::Migrator, PgPool, Postgres};
use tracing::info;

/// Embedded migration versions split by whether the database has them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<i64>,
    pub pending: Vec<i64>,
}

impl MigrationReport {
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }
}

pub fn migrator() -> Migrator {
    sqlx::migrate!("../migrations")
}

/// Brings the schema up to date
///
/// Each file runs in its own transaction; a failure leaves earlier files applied.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let migrator = migrator();
    info!(embedded = migrator.iter().count(), "Applying schema migrations");

    migrator.run(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Schema migration failed");
        e
    })?;

    info!("Schema is current");
    Ok(())
}

/// Compares the embedded migrations with the database's bookkeeping table
pub async fn migration_report(pool: &PgPool) -> Result<MigrationReport, sqlx::Error> {
    let tracked: Option<String> =
        sqlx::query_scalar("SELECT to_regclass('public._sqlx_migrations')::text")
            .fetch_one(pool)
            .await?;

    let done: Vec<i64> = match tracked {
        Some(_) => {
            sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
                .fetch_all(pool)
                .await?
        }
        None => Vec::new(),
    };

    let (applied, pending): (Vec<i64>, Vec<i64>) = migrator()
        .iter()
        .map(|migration| migration.version)
        .partition(|version| done.contains(version));

    Ok(MigrationReport { applied, pending })
}

/// Creates the target database if the server does not have it yet
///
/// Used by local tooling and the database-backed test suites.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        return Ok(());
    }

    info!("Creating missing database");
    Postgres::create_database(database_url).await
}
