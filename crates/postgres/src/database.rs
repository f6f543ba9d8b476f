use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connection string used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/checkin";

/// Creates a connection pool to the PostgreSQL database at `database_url`.
///
/// Connections are acquired with a short timeout so a scan waits seconds,
/// not minutes, when the database is unreachable.
pub async fn create_connection_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Checks the pool can run a query and returns the server version.
pub async fn test_connection(pool: &PgPool) -> Result<String, sqlx::Error> {
    let version: String = sqlx::query_scalar("SELECT version()")
        .fetch_one(pool)
        .await?;

    log::info!("✅ Database connection successful: {}", version);
    Ok(version)
}

/// Creates the check-in and rejection tables if they do not exist yet.
///
/// Both tables are keyed by identifier; the primary keys are what make
/// concurrent inserts for the same identifier resolve to a single row.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS checkins (
            identifier VARCHAR(50) PRIMARY KEY,
            registered_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rejections (
            identifier VARCHAR(50) PRIMARY KEY,
            reason TEXT NOT NULL,
            rejected_by VARCHAR(255),
            rejected_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    log::info!("🗃️ Check-in schema is ready");
    Ok(())
}
