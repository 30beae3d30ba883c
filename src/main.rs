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

use ephemeral_board::api::MgmtState;
use ephemeral_board::config::Config;
use ephemeral_board::{AppBuilder, Workers, adapters, telemetry};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// A wired board that has bound its ports but not started serving.
struct Board {
    api_listener: TcpListener,
    mgmt_listener: TcpListener,
    api_router: axum::Router,
    mgmt_router: axum::Router,
    workers: Workers,
}

async fn open_board(config: &Config, shutdown_tx: &watch::Sender<bool>) -> anyhow::Result<Board> {
    let pool = adapters::database::init_pool(&config.database).await?;
    ephemeral_board::run_migrations(&pool).await?;
    ephemeral_board::spawn_signal_handler(shutdown_tx.clone());

    let app = AppBuilder::new(config.clone()).with_database(pool).build()?;
    let api_router = ephemeral_board::api::app_router(config.clone(), app.services)?;
    let mgmt_router = ephemeral_board::api::mgmt_router(MgmtState { health_service: app.health_service });

    let api_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let mgmt_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.mgmt_port).parse()?;
    let api_listener = TcpListener::bind(api_addr).await?;
    let mgmt_listener = TcpListener::bind(mgmt_addr).await?;

    tracing::info!(address = %api_addr, "board API listening under /api/v1");
    tracing::info!(address = %mgmt_addr, "management server listening");

    Ok(Board { api_listener, mgmt_listener, api_router, mgmt_router, workers: app.workers })
}

fn serve(
    listener: TcpListener,
    router: axum::Router,
    mut shutdown_rx: watch::Receiver<bool>,
) -> impl Future<Output = std::io::Result<()>> {
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|&s| s).await;
        })
        .into_future()
}

/// Waits for the sweep loop to notice shutdown. A sweep in flight is allowed to finish.
async fn drain_workers(tasks: Vec<JoinHandle<()>>, timeout_secs: u64) {
    tokio::select! {
        _ = futures::future::join_all(tasks) => {
            tracing::info!("Expiry worker stopped.");
        }
        () = tokio::time::sleep(Duration::from_secs(timeout_secs)) => {
            tracing::warn!(timeout_secs, "Expiry worker did not stop in time; abandoning it.");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;
    ephemeral_board::setup_panic_hook();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let board = open_board(&config, &shutdown_tx).instrument(tracing::info_span!("open_board")).await?;

    if config.lifecycle.sweep_interval_secs == 0 {
        tracing::warn!("expiry sweep disabled; posts expire only when someone interacts with them");
    } else {
        tracing::info!(
            sweep_interval_secs = config.lifecycle.sweep_interval_secs,
            feed_limit = config.lifecycle.feed_limit,
            "posts expire ten minutes after creation; sweep scheduled"
        );
    }
    let worker_tasks = board.workers.spawn_all(shutdown_rx.clone());

    if let Err(e) = tokio::try_join!(
        serve(board.api_listener, board.api_router, shutdown_rx.clone()),
        serve(board.mgmt_listener, board.mgmt_router, shutdown_rx),
    ) {
        tracing::error!(error = %e, "Server error");
    }

    let _ = shutdown_tx.send(true);
    drain_workers(worker_tasks, config.server.shutdown_timeout_secs).await;

    telemetry_guard.shutdown();
    Ok(())
}
