//! End-to-end HTTP tests against the full router with in-memory storage

use axum::Router;
use axum::body::Body;
use foodio_server::auth::{JwtConfig, JwtService};
use foodio_server::config::AdminBootstrap;
use foodio_server::{AppState, create_router, identity};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret-0123456789abcdef";
const ADMIN_EMAIL: &str = "admin@foodio.app";
const ADMIN_PASSWORD: &str = "admin-pass";

async fn app() -> Router {
    let state = AppState::in_memory(JwtService::with_config(JwtConfig::new(SECRET)));
    identity::ensure_admin(
        state.repos.users.as_ref(),
        &AdminBootstrap {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
    )
    .await
    .unwrap();
    create_router(state)
}

async fn send(
    app: &Router,
    method: &str,
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
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

async fn register(app: &Router, email: &str, address: Option<&str>) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "email": email,
            "name": "Test User",
            "password": "secret1",
            "address": address,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["access_token"].as_str().unwrap().to_string()
}

async fn user_token(app: &Router, email: &str, address: Option<&str>) -> String {
    register(app, email, address).await;
    login(app, email, "secret1").await
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "foodio-server");
}

#[tokio::test]
async fn register_and_login() {
    let app = app().await;
    let user = register(&app, "ana@example.com", Some("12 Elm St")).await;
    assert_eq!(user["email"], "ana@example.com");
    assert_eq!(user["role"], "user");
    assert!(user.get("password_hash").is_none());
    assert!(user.get("password").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "Ana@Example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert_eq!(body["user"]["address"], "12 Elm St");
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let app = app().await;
    register(&app, "ana@example.com", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": "ANA@example.com", "name": "Ana", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 8002);
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn register_validation_errors() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": "nope", "name": "A", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
    assert!(body["details"].get("email").is_some());
}

#[tokio::test]
async fn login_wrong_password_is_unauthorized() {
    let app = app().await;
    register(&app, "ana@example.com", None).await;

    for (email, password) in [("ana@example.com", "wrong1"), ("who@example.com", "secret1")] {
        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 1002);
        assert_eq!(body["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, body) = send(&app, "GET", "/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1004);

    let forged = JwtService::with_config(JwtConfig::new("some-other-secret-0123456789abcdef"));
    let admin_lookalike = shared::models::User {
        id: 1,
        email: ADMIN_EMAIL.to_string(),
        name: "Admin".to_string(),
        address: None,
        role: shared::models::Role::Admin,
    };
    let token = forged.generate_token(&admin_lookalike).unwrap();
    let (status, _) = send(&app, "GET", "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let app = app().await;
    let token = user_token(&app, "ana@example.com", None).await;

    let checks = [
        ("POST", "/menu"),
        ("DELETE", "/menu/1"),
        ("GET", "/users"),
        ("PUT", "/orders/00000000-0000-0000-0000-000000000000/status"),
    ];
    for (method, uri) in checks {
        let body = (method != "GET" && method != "DELETE").then(|| json!({ "status": "Ready" }));
        let (status, body) = send(&app, method, uri, Some(&token), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(body["code"], 2003);
    }
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn menu_crud() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, soup) = send(
        &app,
        "POST",
        "/menu",
        Some(&admin),
        Some(json!({
            "title": "Tomato Soup",
            "description": "Slow-cooked tomatoes and basil",
            "price": 5.5,
            "category": "Starters",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{soup}");
    assert_eq!(soup["isAvailable"], true);
    assert_eq!(soup["imageUrl"], "");
    assert_eq!(decimal(&soup["price"]), Decimal::new(55, 1));

    let (status, _) = send(
        &app,
        "POST",
        "/menu",
        Some(&admin),
        Some(json!({
            "title": "Tiramisu",
            "description": "Coffee-soaked ladyfingers",
            "price": "6.00",
            "category": "Desserts",
            "isAvailable": false,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, all) = send(&app, "GET", "/menu?category=All", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, desserts) = send(&app, "GET", "/menu?category=Desserts", None, None).await;
    assert_eq!(desserts.as_array().unwrap().len(), 1);
    assert_eq!(desserts[0]["title"], "Tiramisu");

    let id = soup["id"].as_i64().unwrap();
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/menu/{id}"),
        Some(&admin),
        Some(json!({ "price": 6.25, "isAvailable": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&updated["price"]), Decimal::new(625, 2));
    assert_eq!(updated["isAvailable"], false);
    assert_eq!(updated["title"], "Tomato Soup");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/menu/{id}"),
        Some(&admin),
        Some(json!({ "price": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6002);

    let (status, _) = send(&app, "DELETE", &format!("/menu/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/menu/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);
}

#[tokio::test]
async fn menu_create_validation() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(
        &app,
        "POST",
        "/menu",
        Some(&admin),
        Some(json!({
            "title": "Ab",
            "description": "Too short title",
            "price": 3,
            "category": "Starters",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title must be at least 3 characters long");
}

#[tokio::test]
async fn order_flow() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let ana = user_token(&app, "ana@example.com", Some("12 Elm St")).await;
    let bob = user_token(&app, "bob@example.com", None).await;

    // place
    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(&ana),
        Some(json!({
            "items": [{ "menuItemId": 7, "quantity": 2, "price": 9.50 }],
            "total": 19.00,
            "address": "Address needed",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["address"], "12 Elm St");
    assert_eq!(order["status"], "Pending");
    assert_eq!(decimal(&order["total"]), Decimal::new(1900, 2));
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["items"][0]["quantity"], 2);
    assert!(order["items"][0]["menuItem"].is_null());
    assert_eq!(order["user"]["email"], "ana@example.com");
    assert!(order["createdAt"].is_string());
    let id = order["id"].as_str().unwrap().to_string();

    // owner and admin can read, others cannot
    let (status, _) = send(&app, "GET", &format!("/orders/{id}"), Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/orders/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "GET", &format!("/orders/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 4008);

    // listing is scoped
    let (_, bob_orders) = send(&app, "GET", "/orders", Some(&bob), None).await;
    assert!(bob_orders.as_array().unwrap().is_empty());
    let (_, admin_orders) = send(&app, "GET", "/orders", Some(&admin), None).await;
    assert_eq!(admin_orders.as_array().unwrap().len(), 1);

    // status changes are admin only
    let status_uri = format!("/orders/{id}/status");
    let (status, _) = send(&app, "PUT", &status_uri, Some(&ana), Some(json!({ "status": "Ready" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "PUT", &status_uri, Some(&admin), Some(json!({ "status": "Shipped" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4009);

    let (status, body) = send(&app, "PUT", &status_uri, Some(&admin), Some(json!({ "status": "Ready" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Ready");

    let (_, reread) = send(&app, "GET", &format!("/orders/{id}"), Some(&ana), None).await;
    assert_eq!(reread["status"], "Ready");
    assert_eq!(reread["createdAt"], order["createdAt"]);
}

#[tokio::test]
async fn order_lookup_errors() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(&app, "GET", "/orders/not-a-uuid", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);

    let (status, body) = send(
        &app,
        "GET",
        "/orders/6f1c2a8e-0f4b-4c55-9b53-1f0a2d3c4e5f",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let app = app().await;
    let ana = user_token(&app, "ana@example.com", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(&ana),
        Some(json!({ "items": [], "total": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Order must have at least one item");
}

#[tokio::test]
async fn profile_and_user_admin() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let ana = user_token(&app, "ana@example.com", None).await;

    let (status, me) = send(&app, "GET", "/users/me", Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ana@example.com");
    assert!(me["address"].is_null());

    let (status, me) = send(
        &app,
        "PUT",
        "/users/me",
        Some(&ana),
        Some(json!({ "address": "3 Mill Lane", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["address"], "3 Mill Lane");
    // profile updates cannot change the role
    assert_eq!(me["role"], "user");

    let (status, users) = send(&app, "GET", "/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    let ana_id = me["id"].as_i64().unwrap();
    let (status, promoted) = send(
        &app,
        "PUT",
        &format!("/users/{ana_id}"),
        Some(&admin),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["role"], "admin");

    let (_, admin_me) = send(&app, "GET", "/users/me", Some(&admin), None).await;
    let admin_id = admin_me["id"].as_i64().unwrap();
    let (status, body) = send(&app, "DELETE", &format!("/users/{admin_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 8003);

    let (status, _) = send(&app, "DELETE", &format!("/users/{ana_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, "GET", &format!("/users/{ana_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 8001);
}

#[tokio::test]
async fn unstorable_amounts_are_rejected() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let ana = user_token(&app, "ana@example.com", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(&ana),
        Some(json!({
            "items": [{ "menuItemId": 7, "quantity": 1, "price": "19.005" }],
            "total": "19.005",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(&ana),
        Some(json!({
            "items": [{ "menuItemId": 7, "quantity": 1, "price": "1.00" }],
            "total": "123456789012.34",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "total");

    let (status, _) = send(
        &app,
        "POST",
        "/menu",
        Some(&admin),
        Some(json!({
            "title": "Gold Leaf Steak",
            "description": "Absurdly expensive",
            "price": "100000000.00",
            "category": "Main Courses",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, orders) = send(&app, "GET", "/orders", Some(&admin), None).await;
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_bodies_get_error_envelope() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(&admin),
        Some(json!({ "items": "pizza", "total": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
    assert!(body["details"]["reason"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "admin@foodio.app" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn status_body_without_string_status_is_invalid_status() {
    let app = app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let ana = user_token(&app, "ana@example.com", None).await;

    let (_, order) = send(
        &app,
        "POST",
        "/orders",
        Some(&ana),
        Some(json!({ "items": [{ "menuItemId": 1, "quantity": 1, "price": 5 }], "total": 5 })),
    )
    .await;
    let status_uri = format!("/orders/{}/status", order["id"].as_str().unwrap());

    for payload in [json!({}), json!({ "status": 5 }), json!({ "status": null })] {
        let (status, body) = send(&app, "PUT", &status_uri, Some(&admin), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["code"], 4009, "{payload}");
    }

    let (status, body) =
        send(&app, "PUT", &status_uri, Some(&admin), Some(json!({ "status": " Ready " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4009);

    let (_, reread) = send(&app, "GET", &format!("/orders/{}", order["id"].as_str().unwrap()), Some(&ana), None).await;
    assert_eq!(reread["status"], "Pending");
}
