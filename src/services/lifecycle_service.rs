use crate::adapters::database::DbPool;
use crate::adapters::database::post_repo::PostRepository;
use crate::domain::post::ExpiryScope;
use crate::error::{AppError, Result};
use opentelemetry::{KeyValue, global, metrics::Counter};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    expired_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("ephemeral-board");
        Self {
            expired_total: meter
                .u64_counter("board_posts_expired_total")
                .with_description("Posts transitioned from live to expired")
                .build(),
        }
    }
}

/// Owns the `live -> expired` transition of posts.
///
/// The periodic sweep and the on-access check both go through [`PostRepository::expire_due`],
/// so there is exactly one transition rule regardless of who triggers it.
#[derive(Clone, Debug)]
pub struct LifecycleService {
    pool: DbPool,
    repo: PostRepository,
    metrics: Metrics,
}

impl LifecycleService {
    #[must_use]
    pub fn new(pool: DbPool, repo: PostRepository) -> Self {
        Self { pool, repo, metrics: Metrics::new() }
    }

    /// Expires every live post whose expiry has passed. Returns how many were transitioned.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(expired = tracing::field::Empty))]
    pub async fn sweep(&self) -> Result<u64> {
        let count = self.expire(ExpiryScope::All, "sweep").await?;
        tracing::Span::current().record("expired", count);
        Ok(count)
    }

    /// Expires a single post if it is live and past its expiry; otherwise does nothing.
    ///
    /// Callers must re-read the post afterwards to observe its status.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the post does not exist.
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(err(level = "debug"), skip(self), fields(post_id = %post_id))]
    pub async fn check_and_expire(&self, post_id: Uuid) -> Result<()> {
        if self.expire(ExpiryScope::Single(post_id), "access").await? > 0 {
            return Ok(());
        }

        let mut conn = self.pool.acquire().await?;
        if self.repo.exists(&mut conn, post_id).await? { Ok(()) } else { Err(AppError::NotFound) }
    }

    async fn expire(&self, scope: ExpiryScope, trigger: &'static str) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        let count = self.repo.expire_due(&mut conn, OffsetDateTime::now_utc(), scope).await?;

        if count > 0 {
            tracing::debug!(count = %count, trigger, "Posts expired");
            self.metrics.expired_total.add(count, &[KeyValue::new("trigger", trigger)]);
        }

        Ok(count)
    }
}
