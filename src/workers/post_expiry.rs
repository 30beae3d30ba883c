use crate::error::AppError;
use crate::services::lifecycle_service::LifecycleService;
use std::time::Duration;
use tracing::Instrument;

/// Periodic trigger for the expiry sweep.
///
/// A failed iteration is logged and the loop carries on to the next tick.
#[derive(Debug)]
pub struct PostExpiryWorker {
    lifecycle: LifecycleService,
    sweep_interval_secs: u64,
}

impl PostExpiryWorker {
    #[must_use]
    pub const fn new(lifecycle: LifecycleService, sweep_interval_secs: u64) -> Self {
        Self { lifecycle, sweep_interval_secs }
    }

    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        if self.sweep_interval_secs == 0 {
            tracing::info!("Post expiry sweep is disabled (interval = 0)");
            return;
        }

        let mut interval = tokio::time::interval(Duration::from_secs(self.sweep_interval_secs));

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.perform_sweep()
                        .instrument(tracing::info_span!("post_expiry_iteration"))
                        .await
                    {
                        tracing::error!(error = ?e, "Post expiry iteration failed");
                    }
                }
                res = shutdown.changed() => {
                    if res.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::info!("Post expiry loop shutting down...");
    }

    /// Runs one sweep over all live posts.
    ///
    /// # Errors
    /// Returns an error if the database connection or update fails.
    pub async fn perform_sweep(&self) -> Result<u64, AppError> {
        tracing::debug!("Checking for expired posts...");

        let count = self.lifecycle.sweep().await?;
        if count > 0 {
            tracing::info!(count = %count, "Expired posts");
        }
        Ok(count)
    }
}
