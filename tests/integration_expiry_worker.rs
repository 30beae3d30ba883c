#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, missing_debug_implementations, unreachable_pub)]
use ephemeral_board::adapters::database::post_repo::PostRepository;
use ephemeral_board::services::lifecycle_service::LifecycleService;
use ephemeral_board::workers::PostExpiryWorker;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::sync::watch;

mod common;

// Kept in its own binary: no other test here sweeps, so a post staying live means the worker's sweep failed.
#[tokio::test]
async fn test_worker_recovers_after_a_failed_sweep() {
    let app = common::TestApp::spawn().await;
    let author = app.register_user("resilient").await;
    let category = app.create_category(&author.token).await;
    let post_id = common::post_id(&app.create_post(&author.token, &[category]).await);
    app.backdate(post_id, 11).await;

    // A single-connection pool; while the test holds that connection every sweep times out.
    let starved = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_millis(250))
        .connect(&common::database_url())
        .await
        .unwrap();
    let held = starved.acquire().await.unwrap();

    let worker = PostExpiryWorker::new(LifecycleService::new(starved.clone(), PostRepository::new()), 1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(worker.run(shutdown_rx));

    // The first tick fires immediately and fails to get a connection.
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(app.stored_status(post_id).await, "live");
    assert!(!handle.is_finished(), "a failed sweep must not stop the loop");

    drop(held);

    let mut status = String::new();
    for _ in 0..50 {
        status = app.stored_status(post_id).await;
        if status == "expired" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(status, "expired", "the next tick should have swept the post");

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}
