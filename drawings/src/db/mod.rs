//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! The Postgres gateway uses this module to open its SQLx pool and bring the
//! `drawings` table up to date before serving any request.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Open a `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
