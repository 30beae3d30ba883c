#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, missing_debug_implementations, unreachable_pub)]
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

mod common;

#[tokio::test]
async fn test_create_and_list_categories() {
    let app = common::TestApp::spawn().await;
    let user = app.register_user("curator").await;
    let name = format!("news_{}", Uuid::new_v4().simple());

    let resp = app
        .client
        .post(format!("{}/categories", app.server_url))
        .bearer_auth(&user.token)
        .json(&json!({ "name": format!("  {name}  ") }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["name"], name);

    let resp = app.client.get(format!("{}/categories", app.server_url)).bearer_auth(&user.token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let categories: Vec<Value> = resp.json().await.unwrap();
    assert!(categories.iter().any(|c| c["id"] == created["id"] && c["name"] == name));
}

#[tokio::test]
async fn test_category_name_rules() {
    let app = common::TestApp::spawn().await;
    let user = app.register_user("namer").await;
    let name = format!("sports_{}", Uuid::new_v4().simple());

    let create = |name: String| {
        app.client
            .post(format!("{}/categories", app.server_url))
            .bearer_auth(&user.token)
            .json(&json!({ "name": name }))
            .send()
    };

    assert_eq!(create(name.clone()).await.unwrap().status(), StatusCode::CREATED);
    assert_eq!(create(name).await.unwrap().status(), StatusCode::CONFLICT);
    assert_eq!(create("   ".to_string()).await.unwrap().status(), StatusCode::BAD_REQUEST);
}
