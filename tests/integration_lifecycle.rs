#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, missing_debug_implementations, unreachable_pub)]
use ephemeral_board::error::AppError;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

mod common;

#[tokio::test]
async fn test_new_post_expires_ten_minutes_after_creation() {
    let app = common::TestApp::spawn().await;
    let author = app.register_user("lifespan").await;
    let category = app.create_category(&author.token).await;

    let post = app.create_post(&author.token, &[category]).await;

    let created = OffsetDateTime::parse(post["createdAt"].as_str().unwrap(), &Rfc3339).unwrap();
    let expires = OffsetDateTime::parse(post["expiresAt"].as_str().unwrap(), &Rfc3339).unwrap();
    assert_eq!(expires - created, time::Duration::minutes(10));

    assert_eq!(post["status"], "live");
    let left = post["timeLeftMs"].as_i64().unwrap();
    assert!(left > 590_000 && left <= 600_000, "unexpected timeLeftMs {left}");
    let human = post["timeLeftHuman"].as_str().unwrap();
    assert!(human == "9 minutes remaining" || human == "10 minutes remaining", "unexpected {human}");
}

#[tokio::test]
async fn test_sweep_expires_exactly_the_due_posts() {
    let app = common::TestApp::spawn().await;
    let author = app.register_user("sweeper").await;
    let category = app.create_category(&author.token).await;

    let old_a = common::post_id(&app.create_post(&author.token, &[category]).await);
    let old_b = common::post_id(&app.create_post(&author.token, &[category]).await);
    let fresh = common::post_id(&app.create_post(&author.token, &[category]).await);

    app.backdate(old_a, 11).await;
    app.backdate(old_b, 20).await;

    let swept = app.lifecycle.sweep().await.unwrap();
    assert!(swept >= 2, "expected at least our two posts to expire, got {swept}");

    assert_eq!(app.stored_status(old_a).await, "expired");
    assert_eq!(app.stored_status(old_b).await, "expired");
    assert_eq!(app.stored_status(fresh).await, "live");

    // A second pass has nothing left to do for these posts.
    app.lifecycle.sweep().await.unwrap();
    assert_eq!(app.stored_status(old_a).await, "expired");
    assert_eq!(app.stored_status(fresh).await, "live");
}

#[tokio::test]
async fn test_post_nine_minutes_old_survives_sweep() {
    let app = common::TestApp::spawn().await;
    let author = app.register_user("survivor").await;
    let category = app.create_category(&author.token).await;

    let post_id = common::post_id(&app.create_post(&author.token, &[category]).await);
    app.backdate(post_id, 9).await;

    app.lifecycle.sweep().await.unwrap();
    assert_eq!(app.stored_status(post_id).await, "live");

    let body: Value = app.get_post(&author.token, post_id).await.json().await.unwrap();
    assert_eq!(body["timeLeftHuman"], "0 minutes remaining");
}

#[tokio::test]
async fn test_check_and_expire() {
    let app = common::TestApp::spawn().await;
    let author = app.register_user("checker").await;
    let category = app.create_category(&author.token).await;

    assert!(matches!(app.lifecycle.check_and_expire(Uuid::now_v7()).await, Err(AppError::NotFound)));

    let post_id = common::post_id(&app.create_post(&author.token, &[category]).await);

    // Not yet due: no-op.
    app.lifecycle.check_and_expire(post_id).await.unwrap();
    assert_eq!(app.stored_status(post_id).await, "live");

    app.backdate(post_id, 11).await;
    app.lifecycle.check_and_expire(post_id).await.unwrap();
    assert_eq!(app.stored_status(post_id).await, "expired");

    // Already expired: still a no-op, never an error.
    app.lifecycle.check_and_expire(post_id).await.unwrap();
    assert_eq!(app.stored_status(post_id).await, "expired");
}

#[tokio::test]
async fn test_concurrent_sweep_and_check_converge() {
    let app = common::TestApp::spawn().await;
    let author = app.register_user("racer").await;
    let category = app.create_category(&author.token).await;

    let post_id = common::post_id(&app.create_post(&author.token, &[category]).await);
    app.backdate(post_id, 15).await;

    let (swept, checked, checked_again) = tokio::join!(
        app.lifecycle.sweep(),
        app.lifecycle.check_and_expire(post_id),
        app.lifecycle.check_and_expire(post_id),
    );

    swept.unwrap();
    checked.unwrap();
    checked_again.unwrap();
    assert_eq!(app.stored_status(post_id).await, "expired");
}

#[tokio::test]
async fn test_expired_post_rejects_reply_and_votes() {
    let app = common::TestApp::spawn().await;
    let author = app.register_user("expired_author").await;
    let reader = app.register_user("expired_reader").await;
    let category = app.create_category(&author.token).await;

    let post_id = common::post_id(&app.create_post(&author.token, &[category]).await);
    app.backdate(post_id, 11).await;

    let resp = app.reply(&reader.token, post_id, "too late").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "This message has expired and no longer accepts interactions.");

    // The gate persisted the transition.
    assert_eq!(app.stored_status(post_id).await, "expired");

    for kind in ["like", "dislike"] {
        let resp = app.vote(&reader.token, post_id, kind).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    let body: Value = app.get_post(&reader.token, post_id).await.json().await.unwrap();
    assert_eq!(body["status"], "expired");
    assert_eq!(body["timeLeftMs"], 0);
    assert_eq!(body["timeLeftHuman"], "Expired");
    assert!(body["replies"].as_array().unwrap().is_empty());
    assert!(body["likes"].as_array().unwrap().is_empty());
    assert!(body["dislikes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_history_lists_only_expired_posts() {
    let app = common::TestApp::spawn().await;
    let author = app.register_user("historian").await;
    let category = app.create_category(&author.token).await;

    let old = common::post_id(&app.create_post(&author.token, &[category]).await);
    let fresh = common::post_id(&app.create_post(&author.token, &[category]).await);
    app.backdate(old, 30).await;
    app.lifecycle.check_and_expire(old).await.unwrap();

    let resp = app
        .client
        .get(format!("{}/messages/categories/{category}/history", app.server_url))
        .bearer_auth(&author.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let history: Vec<Value> = resp.json().await.unwrap();

    let ids: Vec<Uuid> = history.iter().map(common::post_id).collect();
    assert_eq!(ids, vec![old]);
    assert!(!ids.contains(&fresh));
    assert_eq!(history[0]["timeLeftHuman"], "Expired");
}

#[tokio::test]
async fn test_worker_sweeps_on_its_interval() {
    let mut config = common::get_test_config();
    config.lifecycle.sweep_interval_secs = 1;
    let app = common::TestApp::spawn_with_config(config).await;

    let author = app.register_user("worker").await;
    let category = app.create_category(&author.token).await;
    let post_id = common::post_id(&app.create_post(&author.token, &[category]).await);
    app.backdate(post_id, 11).await;

    let mut status = String::new();
    for _ in 0..50 {
        status = app.stored_status(post_id).await;
        if status == "expired" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(status, "expired", "worker never swept the post");
}
