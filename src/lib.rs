#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;
pub mod workers;

use crate::adapters::database::DbPool;
use crate::adapters::database::category_repo::CategoryRepository;
use crate::adapters::database::post_repo::PostRepository;
use crate::adapters::database::reply_repo::ReplyRepository;
use crate::adapters::database::user_repo::UserRepository;
use crate::adapters::database::vote_repo::VoteRepository;
use crate::api::ServiceContainer;
use crate::config::Config;
use crate::services::account_service::AccountService;
use crate::services::auth_service::AuthService;
use crate::services::category_service::CategoryService;
use crate::services::health_service::HealthService;
use crate::services::lifecycle_service::LifecycleService;
use crate::services::post_service::PostService;
use crate::services::rate_limit_service::RateLimitService;
use crate::workers::PostExpiryWorker;
use anyhow::Context;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Background tasks owned by the process.
#[derive(Debug)]
pub struct Workers {
    pub post_expiry: PostExpiryWorker,
}

impl Workers {
    #[must_use]
    pub fn spawn_all(self, shutdown_rx: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        vec![tokio::spawn(self.post_expiry.run(shutdown_rx))]
    }
}

/// Everything `main` needs after wiring: API services, the management probe and workers.
#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
    pub lifecycle_service: LifecycleService,
    pub workers: Workers,
}

/// Wires repositories, services and workers together without touching the network.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    pool: Option<DbPool>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, pool: None }
    }

    #[must_use]
    pub fn with_database(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// # Errors
    /// Returns an error if no database pool was supplied.
    pub fn build(self) -> anyhow::Result<App> {
        let pool = self.pool.context("AppBuilder requires a database pool")?;
        let config = self.config;

        let post_repo = PostRepository::new();

        let auth_service = AuthService::new(config.auth.clone());
        let account_service = AccountService::new(pool.clone(), UserRepository::new(), auth_service.clone());
        let category_service = CategoryService::new(pool.clone(), CategoryRepository::new());
        let lifecycle_service = LifecycleService::new(pool.clone(), post_repo.clone());
        let post_service = PostService::new(
            pool.clone(),
            post_repo,
            VoteRepository::new(),
            ReplyRepository::new(),
            CategoryRepository::new(),
            lifecycle_service.clone(),
            config.lifecycle.clone(),
        );
        let rate_limit_service = RateLimitService::new(config.server.trusted_proxies.clone());
        let health_service = HealthService::new(pool.clone(), config.health.clone());

        let workers = Workers {
            post_expiry: PostExpiryWorker::new(lifecycle_service.clone(), config.lifecycle.sweep_interval_secs),
        };

        Ok(App {
            services: ServiceContainer {
                pool,
                account_service,
                auth_service,
                category_service,
                post_service,
                rate_limit_service,
            },
            health_service,
            lifecycle_service,
            workers,
        })
    }
}

/// # Errors
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await.context("failed to run database migrations")?;
    Ok(())
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received, draining");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through tracing so they reach structured logs.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        tracing::error!(location = %location, payload = %payload, "panic");
    }));
}
