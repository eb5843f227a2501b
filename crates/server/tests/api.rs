use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .password_cost(bcrypt_cost())
        .build()
        .await
        .unwrap();
    server::app(engine)
}

fn bcrypt_cost() -> u32 {
    // bcrypt's minimum; keeps registration fast under test.
    4
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
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
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login_as(app: &Router, username: &str) -> String {
    let credentials = json!({ "username": username, "password": "correct horse" });
    let (status, _) = call(app, Method::POST, "/users/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(app, Method::POST, "/users/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, token: &str, uri: &str, body: Value) -> Value {
    let (status, body) = call(app, Method::POST, uri, Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    body["data"].clone()
}

#[tokio::test]
async fn missing_or_bad_token_is_401() {
    let app = test_app().await;

    let (status, body) = call(&app, Method::GET, "/wallets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "invalid user token");

    let (status, _) = call(&app, Method::GET, "/wallets", Some("nope"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_400() {
    let app = test_app().await;
    login_as(&app, "alice").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/users/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid username or password");
}

#[tokio::test]
async fn transaction_lifecycle_keeps_wallet_balances() {
    let app = test_app().await;
    let token = login_as(&app, "alice").await;

    let cash = create(&app, &token, "/wallets", json!({ "name": "Cash", "balance_minor": 0 })).await;
    let bank = create(&app, &token, "/wallets", json!({ "name": "Bank" })).await;
    let food = create(&app, &token, "/categories", json!({ "name": "Food" })).await;
    let cash_id = cash["id"].as_str().unwrap();
    let bank_id = bank["id"].as_str().unwrap();

    let tx = create(
        &app,
        &token,
        "/transactions",
        json!({
            "wallet_id": cash_id,
            "category_id": food["id"],
            "name": "salary",
            "amount_minor": 10_000,
            "date": "2024-01-10T09:00:00Z",
        }),
    )
    .await;
    let tx_id = tx["id"].as_str().unwrap();

    let (_, body) = call(&app, Method::GET, &format!("/wallets/{cash_id}"), Some(&token), None).await;
    assert_eq!(body["data"]["balance_minor"], 10_000);

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/transactions/{tx_id}"),
        Some(&token),
        Some(json!({
            "wallet_id": bank_id,
            "category_id": food["id"],
            "name": "salary",
            "amount_minor": -3_000,
            "date": "2024-01-10T09:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, body) = call(&app, Method::GET, "/wallets", Some(&token), None).await;
    let balances: Vec<(String, i64)> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| {
            (
                w["name"].as_str().unwrap().to_string(),
                w["balance_minor"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        balances,
        [("Bank".to_string(), -3_000), ("Cash".to_string(), 0)]
    );

    let (_, body) = call(&app, Method::GET, "/wallets/total-balance", Some(&token), None).await;
    assert_eq!(body["data"]["total_minor"], -3_000);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/transactions/{tx_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, Method::GET, &format!("/wallets/{bank_id}"), Some(&token), None).await;
    assert_eq!(body["data"]["balance_minor"], 0);
}

#[tokio::test]
async fn other_users_resources_are_404() {
    let app = test_app().await;
    let alice = login_as(&app, "alice").await;
    let bob = login_as(&app, "bob").await;

    let wallet = create(&app, &alice, "/wallets", json!({ "name": "Cash" })).await;
    let wallet_id = wallet["id"].as_str().unwrap();

    let (status, body) = call(&app, Method::GET, &format!("/wallets/{wallet_id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/wallets/{wallet_id}/transactions"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn duplicate_category_is_400_and_referenced_delete_is_409() {
    let app = test_app().await;
    let token = login_as(&app, "alice").await;

    let food = create(&app, &token, "/categories", json!({ "name": "Food" })).await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/categories",
        Some(&token),
        Some(json!({ "name": "food" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let wallet = create(&app, &token, "/wallets", json!({ "name": "Cash" })).await;
    create(
        &app,
        &token,
        "/transactions",
        json!({
            "wallet_id": wallet["id"],
            "category_id": food["id"],
            "name": "lunch",
            "amount_minor": -1_200,
        }),
    )
    .await;

    let food_id = food["id"].as_str().unwrap();
    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/categories/{food_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn filters_validate_dates() {
    let app = test_app().await;
    let token = login_as(&app, "alice").await;

    let (status, body) = call(
        &app,
        Method::GET,
        "/transactions?start=2024-02-01&end=2024-01-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid range: end date cannot be earlier than start date"
    );

    let (status, _) = call(&app, Method::GET, "/transactions/date-range?start=2024-01-01", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::GET,
        "/transactions/date-range?start=01/01/2024&end=2024-01-31",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Method::GET,
        "/transactions/date-range?start=2024-01-01&end=2024-01-31",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn malformed_json_gets_the_envelope() {
    let app = test_app().await;
    let token = login_as(&app, "alice").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/wallets",
        Some(&token),
        Some(json!({ "balance_minor": "lots" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn register_echoes_optional_email() {
    let app = test_app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/users/register",
        None,
        Some(json!({
            "username": "alice",
            "password": "correct horse",
            "email": " alice@example.org ",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["email"], "alice@example.org");

    let (status, body) = call(
        &app,
        Method::POST,
        "/users/register",
        None,
        Some(json!({ "username": "bob", "password": "correct horse", "email": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
