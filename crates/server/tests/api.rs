use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    server::app(engine, db, None)
}

fn basic_auth(username: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {token}")
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth("alice", "password"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn rejects_missing_or_wrong_credentials() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/settings").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::get("/settings")
                .header(header::AUTHORIZATION, basic_auth("alice", "wrong"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn settings_are_seeded_and_color_mode_updates() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "alice");
    assert_eq!(body["color_mode"], "system");
    assert_eq!(body["dark_mode"], Value::Null);
    assert_eq!(body["version"], 1);
    assert_eq!(body["categories"]["account_categories"][0]["name"], "Checking");
    assert_eq!(body["categories"]["transaction_categories"][3]["name"], "Entertainment");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/settings/colorMode",
        Some(json!({ "mode": "dark" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["color_mode"], "dark");
    assert_eq!(body["dark_mode"], true);
    assert_eq!(body["version"], 2);
}

#[tokio::test]
async fn category_lifecycle() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/categories/transaction",
        Some(json!({ "name": "Groceries", "color": "pink.500", "parent": "Food" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["categories"][0]["subcategories"][0]["name"], "Groceries");
    assert_eq!(body["categories"][0]["subcategories"][0]["color"], "green.500");
    let version = body["version"].as_i64().unwrap();

    // Rename "Food" in place with different casing.
    let (status, body) = send(
        &app,
        Method::PATCH,
        "/categories/transaction/0",
        Some(json!({ "name": "FOOD", "color": "orange.500", "version": version })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"][0]["name"], "FOOD");
    assert_eq!(body["categories"][0]["color"], "orange.500");

    // A parent with children cannot move under another parent.
    let (status, body) = send(
        &app,
        Method::PATCH,
        "/categories/transaction/0",
        Some(json!({ "name": "FOOD", "color": "orange.500", "new_parent": "Bills" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("FOOD"));

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/categories/transaction/0",
        Some(json!({ "parent": "FOOD" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"]["name"], "Groceries");
    assert!(body["categories"][0].get("subcategories").is_none());
}

#[tokio::test]
async fn stale_version_is_409() {
    let app = test_app().await;
    let (_, body) = send(&app, Method::GET, "/categories/account", None).await;
    let version = body["version"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/categories/account",
        Some(json!({ "name": "Brokerage", "color": "cyan.500", "version": version })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/categories/account",
        Some(json!({ "name": "Retirement", "color": "cyan.500", "version": version })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn invalid_category_input() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/categories/account",
        Some(json!({ "name": "  ", "color": "cyan.500" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        Method::POST,
        "/categories/account",
        Some(json!({ "name": "savings", "color": "cyan.500" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::GET, "/categories/budgets", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn accounts_and_dashboard() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/accounts",
        Some(json!({
            "source": "bridge",
            "accounts": [
                { "id": "chk", "name": "Checking", "org": "First Bank", "balance": "70.00", "balance_date": 100 },
                { "id": "sav", "name": "Savings", "balance": "30.00", "balance_date": 200 },
                { "id": "cc", "name": "Visa", "balance": "-20.00" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["written"], 3);

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/accounts/chk",
        Some(json!({ "category": "Checking", "display_name": "Everyday" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Everyday");
    assert_eq!(body["color"], "green.500");
    assert_eq!(body["balance_minor"], 7000);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/accounts/sav",
        Some(json!({ "category": "Vacation" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PATCH, "/accounts/cc", Some(json!({ "hidden": true }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/accounts", None).await;
    assert_eq!(body["accounts"].as_array().unwrap().len(), 2);
    let (_, body) = send(&app, Method::GET, "/accounts?show_hidden=true", None).await;
    assert_eq!(body["accounts"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, Method::GET, "/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["net_worth_minor"], 10_000);
    assert_eq!(body["latest_balance_date"], 200);
    assert_eq!(body["uncategorized_accounts"], 1);
    assert_eq!(body["breakdown"][0]["label"], "Checking");
    assert_eq!(body["breakdown"][0]["total_minor"], 7000);
    assert_eq!(body["breakdown"][0]["share"], 70.0);
    assert_eq!(body["breakdown"][1]["label"], "Uncategorized");
    assert_eq!(body["breakdown"][1]["color"], "red.500");
}

#[tokio::test]
async fn malformed_balance_is_422() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/accounts",
        Some(json!({ "accounts": [{ "name": "Cash", "balance": "12.345" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn sync_without_configuration_is_503() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::POST, "/sync", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "bank sync is not configured");
}
