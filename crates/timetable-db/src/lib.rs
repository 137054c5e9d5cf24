//! # Timetable DB
//!
//! Database pool and migrations for the timetable service.
//!
//! This crate provides PostgreSQL connection pool initialization and the
//! embedded schema migrations.
//!
//! # Example
//!
//! ```ignore
//! use timetable_db::{connect, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sqlx::Error> {
//!     let pool = connect("postgres://localhost/timetable", 5).await?;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Opens a PostgreSQL connection pool.
///
/// The returned pool is cheaply cloneable and should be created once at
/// startup and shared.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!(max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies the embedded migrations under `migrations/` at the workspace root.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
