//! Postgres-backed document store.
//!
//! Records are stored as JSONB documents in a single `documents` table,
//! keyed by an internal UUID and carrying an application-visible `pk`
//! allocated from the `counters` table. The [`query::QueryInterface`]
//! translates typed filters into store queries; [`model`] holds the
//! generic create/save/delete operations.

pub mod model;
pub mod models;
pub mod outbox;
pub mod query;
pub mod repos;
pub mod store;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

pub use model::{create, delete, save, Document};
pub use query::{Filters, QueryInterface};
pub use store::{DocumentStore, StoreError};

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Create a pool without connecting eagerly.
///
/// Connections are established on first use, which lets the router be
/// constructed (and exercised in tests) without a live database.
pub fn create_lazy_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    Ok(PgPoolOptions::new()
        .max_connections(20)
        .connect_lazy(database_url)?)
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from the crate-local `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
