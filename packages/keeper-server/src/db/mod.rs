//! PostgreSQL store: the authoritative per-user, per-kind collections.
//!
//! Every item query is generic over [`sqlx::PgExecutor`] so it runs both
//! on the pool and inside the sync engine's transaction.

use eyre::{Result, WrapErr};
use keeper_core::Error;
use sqlx::postgres::{PgPool, PgPoolOptions};

pub mod binaries;
pub mod cards;
pub mod clients;
pub mod credentials;
mod rows;
pub mod texts;
pub mod users;

/// Create a database connection pool
pub async fn create_pool(database_uri: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_uri)
        .await
        .wrap_err("Failed to connect to database")
}

/// Run pending migrations (uses the migration files in migrations/)
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .wrap_err("Failed to run database migrations")?;
    Ok(())
}

/// Map sqlx failures into the domain taxonomy. Unique-login violations
/// surface as [`Error::AlreadyExists`]; everything else is storage.
pub(crate) fn map_sqlx(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::RowNotFound => Error::NotFound,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            Error::AlreadyExists
        }
        _ => Error::Storage(err.to_string()),
    }
}
