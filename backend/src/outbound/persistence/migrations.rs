//! Embedded Diesel migrations for the identity schema.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Migrations compiled from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {0}")]
    Connect(#[from] diesel::ConnectionError),
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
    #[error("migration task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn run_blocking(database_url: &str) -> Result<usize, MigrationError> {
    let mut conn = PgConnection::establish(database_url)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    Ok(applied.len())
}

/// Apply pending migrations on the blocking pool.
///
/// Returns the number of migrations applied.
pub async fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_blocking(&url)).await??;
    info!(applied, "database migrations applied");
    Ok(applied)
}
