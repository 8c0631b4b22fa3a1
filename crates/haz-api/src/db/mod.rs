//! # Database Persistence Layer
//!
//! Optional Postgres write-through via SQLx. When `DATABASE_URL` is set,
//! shipments and completed records persist to PostgreSQL and the in-memory
//! store is hydrated from it on startup. When absent, the API runs
//! in-memory only (development and tests).
//!
//! The in-memory store stays authoritative for transition decisions; the
//! database never arbitrates a race.

pub mod completed;
pub mod shipments;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 Shipments will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Hydrate the in-memory stores from the database on startup.
pub async fn hydrate(state: &crate::state::AppState, pool: &PgPool) -> Result<(), sqlx::Error> {
    let records = shipments::load_all(pool).await?;
    let count = records.len();
    for record in records {
        state.shipments.hydrate(record);
    }
    let completed_records = completed::load_all(pool).await?;
    let completed_count = completed_records.len();
    for record in completed_records {
        state.completed.hydrate(record);
    }
    tracing::info!(
        shipments = count,
        completed = completed_count,
        "hydrated stores from database"
    );
    Ok(())
}
