//! Process-wide Postgres pool, created on first use.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::settings::settings;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// The shared pool. A failed connection attempt is not cached, so the next
/// caller retries.
pub async fn get_pool() -> Result<&'static PgPool, sqlx::Error> {
    POOL.get_or_try_init(|| async {
        let database = &settings().database;
        let pool = PgPoolOptions::new()
            .max_connections(database.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&database.url)
            .await?;
        tracing::info!(
            "Connected to Postgres (max {} connections)",
            database.max_connections
        );
        Ok(pool)
    })
    .await
}
