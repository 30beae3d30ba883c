pub mod category_repo;
pub mod post_repo;
pub mod records;
pub mod reply_repo;
pub mod user_repo;
pub mod vote_repo;

use crate::config::DatabaseConfig;
use backon::{ExponentialBuilder, Retryable};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;

pub type DbPool = Pool<Postgres>;

/// Initializes the database connection pool, retrying the first connection with backoff.
///
/// # Errors
/// Returns `sqlx::Error` if the connection still fails after all retries.
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let retry_strategy = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(config.connect_retries);

    (|| async {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.url)
            .await
    })
    .retry(&retry_strategy)
    .when(|e| {
        tracing::warn!(error = %e, "Failed to connect to database, retrying...");
        true
    })
    .await
}
