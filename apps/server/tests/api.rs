//! End-to-end tests over the full router, driven without a socket.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use shopfront_core::{NewProduct, Product, UserRole};
use shopfront_db::{hash_password, Database, DbConfig};
use shopfront_server::mailer::MemoryMailer;
use shopfront_server::{app, AppState, ServerConfig};

const PASSWORD: &str = "correct horse";

struct TestApp {
    router: Router,
    state: AppState,
    mailer: Arc<MemoryMailer>,
}

async fn setup_with(config: ServerConfig) -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let mailer = Arc::new(MemoryMailer::default());
    let state = AppState::new(db, config, mailer.clone()).unwrap();

    let hash = hash_password(PASSWORD).unwrap();
    state
        .db
        .users()
        .create("alice", &hash, "Alice Admin", UserRole::Admin)
        .await
        .unwrap();
    state
        .db
        .users()
        .create("bob", &hash, "Bob Cashier", UserRole::Cashier)
        .await
        .unwrap();

    TestApp {
        router: app(state.clone()),
        state,
        mailer,
    }
}

async fn setup() -> TestApp {
    setup_with(ServerConfig::for_tests()).await
}

async fn add_product(app: &TestApp, code: &str, name: &str, price: i64, stock: i64) -> Product {
    app.state
        .db
        .products()
        .insert(&NewProduct {
            code: code.to_string(),
            barcode: None,
            name: name.to_string(),
            price,
            category_id: None,
            stock,
            reorder_level: 2,
        })
        .await
        .unwrap()
}

async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("shopfront_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn login(app: &TestApp, username: &str) -> String {
    let (status, headers, body) = send(
        app,
        post_json(
            "/api/auth/login",
            None,
            json!({ "username": username, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    session_cookie(&headers).expect("session cookie")
}

/// One unit-priced line with 8% tax, sold for cash.
fn cash_sale(product: &Product, quantity: i64) -> Value {
    let gross = product.price * quantity;
    let tax = gross * 800 / 10_000;
    let total = gross + tax;
    json!({
        "items": [{
            "product_id": product.id,
            "quantity": quantity,
            "unit_price": product.price,
            "tax_amount": tax,
            "subtotal": total,
        }],
        "payment_type": "cash",
        "total_amount": total,
        "tax_amount": tax,
    })
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_api_requires_session() {
    let app = setup().await;

    let (status, _, body) = send(&app, get("/api/products/search?q=soap", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let (status, _, _) = send(&app, get("/api/products/search?q=soap", Some("shopfront_session=garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_password_is_rejected() {
    let app = setup().await;

    let (status, headers, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            json!({ "username": "alice", "password": "wrong" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid username or password");
    assert!(session_cookie(&headers).is_none());
}

#[tokio::test]
async fn test_me_returns_session_user() {
    let app = setup().await;
    let cookie = login(&app, "bob").await;

    let (status, _, body) = send(&app, get("/api/auth/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "bob");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_form_redirects() {
    let app = setup().await;

    let form = |password: &str| {
        Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username=alice&password={}", password)))
            .unwrap()
    };

    let (status, headers, _) = send(&app, form("correct+horse")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/");
    assert!(session_cookie(&headers).is_some());

    let (status, headers, _) = send(&app, form("nope")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/login?error=1");
}

#[tokio::test]
async fn test_index_redirects_without_session() {
    let app = setup().await;

    let (status, headers, _) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/login");

    let cookie = login(&app, "bob").await;
    let (status, _, _) = send(&app, get("/", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_needs_no_session() {
    let app = setup().await;

    let (status, _, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
    assert_eq!(body["database"], "up");
    assert_eq!(body["migrations"]["applied"], body["migrations"]["embedded"]);
    assert!(body["migrations"]["applied"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_deactivated_user_loses_session() {
    let app = setup().await;
    let cookie = login(&app, "bob").await;

    let (status, _, _) = send(&app, get("/api/notifications", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);

    sqlx::query("UPDATE users SET is_active = 0 WHERE username = 'bob'")
        .execute(app.state.db.pool())
        .await
        .unwrap();

    let (status, _, body) = send(&app, get("/api/notifications", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let (status, headers, _) = send(&app, get("/", Some(&cookie))).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_role_is_read_from_the_users_table() {
    let app = setup().await;
    let cookie = login(&app, "bob").await;

    sqlx::query("UPDATE users SET role = 'admin' WHERE username = 'bob'")
        .execute(app.state.db.pool())
        .await
        .unwrap();

    let (status, _, _) = send(&app, get("/api/activity", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_product_search() {
    let app = setup().await;
    add_product(&app, "SOAP-1", "Hand Soap", 1000, 10).await;
    add_product(&app, "RICE-5", "Rice 5kg", 4500, 3).await;
    let cookie = login(&app, "bob").await;

    let (status, _, body) = send(&app, get("/api/products/search?q=soap", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["code"], "SOAP-1");

    let (status, _, body) = send(&app, get("/api/products/search", Some(&cookie))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "query required");
}

#[tokio::test]
async fn test_stock_adjust_unknown_product() {
    let app = setup().await;
    let cookie = login(&app, "bob").await;

    let (status, _, body) = send(
        &app,
        post_json("/api/products/stock", Some(&cookie), json!({ "product_id": 999, "stock": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_stock_adjust_raises_low_stock_notification() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 10).await;
    let cookie = login(&app, "bob").await;

    let (status, _, body) = send(
        &app,
        post_json("/api/products/stock", Some(&cookie), json!({ "product_id": soap.id, "stock": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["new_stock"], 1);

    let (_, _, body) = send(&app, get("/api/notifications?unread_only=true", Some(&cookie))).await;
    assert_eq!(body["unread"], 1);
    assert_eq!(body["data"][0]["kind"], "low_stock");
}

#[tokio::test]
async fn test_mark_notifications_read() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 10).await;
    let rice = add_product(&app, "RICE-5", "Rice 5kg", 4500, 10).await;
    let cookie = login(&app, "bob").await;

    for product in [&soap, &rice] {
        send(
            &app,
            post_json("/api/products/stock", Some(&cookie), json!({ "product_id": product.id, "stock": 0 })),
        )
        .await;
    }

    let (_, _, body) = send(&app, get("/api/notifications?unread_only=true", Some(&cookie))).await;
    assert_eq!(body["unread"], 2);
    let first = body["data"][0]["id"].as_i64().unwrap();

    let uri = format!("/api/notifications/{}/read", first);
    let (status, _, body) = send(&app, post_json(&uri, Some(&cookie), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, _, body) = send(&app, get("/api/notifications?unread_only=true", Some(&cookie))).await;
    assert_eq!(body["unread"], 1);

    let (status, _, _) = send(&app, post_json("/api/notifications/9999/read", Some(&cookie), json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = send(&app, post_json("/api/notifications/read-all", Some(&cookie), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    let (_, _, body) = send(&app, get("/api/notifications?unread_only=true", Some(&cookie))).await;
    assert_eq!(body["unread"], 0);
    let (_, _, body) = send(&app, get("/api/notifications", Some(&cookie))).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_empty_sale_is_rejected() {
    let app = setup().await;
    let cookie = login(&app, "bob").await;

    let (status, _, _) = send(
        &app,
        post_json(
            "/api/sales",
            Some(&cookie),
            json!({ "items": [], "payment_type": "cash", "total_amount": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_legacy_flow_two_units() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 10).await;
    let cookie = login(&app, "bob").await;

    // The browser writes the new absolute level, then commits the sale.
    let (status, _, _) = send(
        &app,
        post_json("/api/products/stock", Some(&cookie), json!({ "product_id": soap.id, "stock": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&app, post_json("/api/sales", Some(&cookie), cash_sale(&soap, 2))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let sale_id = body["data"]["sale_id"].as_i64().unwrap();
    assert!(body["data"]["invoice_number"].as_str().unwrap().starts_with("INV-"));

    let (status, _, body) = send(&app, get(&format!("/api/sales/{}", sale_id), Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sale"]["total_amount"], 2160);
    assert_eq!(body["data"]["sale"]["paid_status"], "paid");
    assert_eq!(body["data"]["items"][0]["quantity"], 2);

    let product = app.state.db.products().get_by_id(soap.id).await.unwrap().unwrap();
    assert_eq!(product.stock, 8);
}

#[tokio::test]
async fn test_duplicate_commit_creates_two_sales() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 10).await;
    let cookie = login(&app, "bob").await;

    let payload = cash_sale(&soap, 1);
    let (_, _, first) = send(&app, post_json("/api/sales", Some(&cookie), payload.clone())).await;
    let (_, _, second) = send(&app, post_json("/api/sales", Some(&cookie), payload)).await;

    assert_ne!(first["data"]["sale_id"], second["data"]["sale_id"]);
    assert_ne!(first["data"]["invoice_number"], second["data"]["invoice_number"]);
}

#[tokio::test]
async fn test_checkout_rejects_oversell() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 1).await;
    let cookie = login(&app, "bob").await;

    let (status, _, body) = send(
        &app,
        post_json("/api/sales/checkout", Some(&cookie), cash_sale(&soap, 2)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    let product = app.state.db.products().get_by_id(soap.id).await.unwrap().unwrap();
    assert_eq!(product.stock, 1);
}

#[tokio::test]
async fn test_checkout_decrements_stock() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 5).await;
    let cookie = login(&app, "bob").await;

    let (status, _, _) = send(
        &app,
        post_json("/api/sales/checkout", Some(&cookie), cash_sale(&soap, 2)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let product = app.state.db.products().get_by_id(soap.id).await.unwrap().unwrap();
    assert_eq!(product.stock, 3);
}

#[tokio::test]
async fn test_card_payment_is_unsupported() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 10).await;
    let cookie = login(&app, "bob").await;

    let mut payload = cash_sale(&soap, 1);
    payload["payment_type"] = json!("card");

    let (status, _, body) = send(&app, post_json("/api/sales", Some(&cookie), payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "UNSUPPORTED_PAYMENT");
}

#[tokio::test]
async fn test_oversized_line_is_a_bad_request() {
    let app = setup().await;
    let cookie = login(&app, "bob").await;

    let (status, _, body) = send(
        &app,
        post_json(
            "/api/sales",
            Some(&cookie),
            json!({
                "items": [{
                    "product_id": 1,
                    "quantity": 3,
                    "unit_price": i64::MAX / 2,
                    "subtotal": 1,
                }],
                "payment_type": "cash",
                "total_amount": 1,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_customers_create_and_list() {
    let app = setup().await;
    let cookie = login(&app, "bob").await;

    let (status, _, body) = send(
        &app,
        post_json(
            "/api/customers",
            Some(&cookie),
            json!({ "name": "Dana Okafor", "phone": "555-0100" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Dana Okafor");

    let (status, _, _) = send(
        &app,
        post_json(
            "/api/customers",
            Some(&cookie),
            json!({ "name": "Lee", "email": "not-an-address" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(&app, get("/api/customers?q=dana", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let customers = body["data"].as_array().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["phone"], "555-0100");

    let (_, _, body) = send(&app, get("/api/customers?q=nobody", Some(&cookie))).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_credit_sale_is_settled_by_payments() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 10).await;
    let cookie = login(&app, "bob").await;

    let (_, _, body) = send(
        &app,
        post_json("/api/customers", Some(&cookie), json!({ "name": "Dana Okafor" })),
    )
    .await;
    let customer_id = body["data"]["id"].as_i64().unwrap();

    let mut sale = cash_sale(&soap, 2);
    sale["customer_id"] = json!(customer_id);
    sale["amount_paid"] = json!(1000);
    let (status, _, body) = send(&app, post_json("/api/sales", Some(&cookie), sale)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let sale_id = body["data"]["sale_id"].as_i64().unwrap();

    let (_, _, body) = send(&app, get("/api/sales/outstanding", Some(&cookie))).await;
    assert_eq!(body["outstanding_total"], 1160);

    let uri = format!("/api/sales/{}/payments", sale_id);

    // More than is owed
    let (status, _, body) = send(
        &app,
        post_json(&uri, Some(&cookie), json!({ "amount": 2000, "payment_type": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BUSINESS_RULE");

    let (status, _, body) = send(
        &app,
        post_json("/api/sales/9999/payments", Some(&cookie), json!({ "amount": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _, body) = send(
        &app,
        post_json(&uri, Some(&cookie), json!({ "amount": 160, "payment_type": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["paid_status"], "partial");

    let (status, _, body) = send(&app, post_json(&uri, Some(&cookie), json!({ "amount": 1000 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["paid_status"], "paid");
    assert_eq!(body["data"]["amount_paid"], 2160);

    // Nothing left to pay
    let (status, _, _) = send(&app, post_json(&uri, Some(&cookie), json!({ "amount": 1 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, _, body) = send(&app, get("/api/sales/outstanding", Some(&cookie))).await;
    assert_eq!(body["outstanding_total"], 0);
}

#[tokio::test]
async fn test_daily_report_counts_todays_sales() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 10).await;
    let cookie = login(&app, "bob").await;

    send(&app, post_json("/api/sales", Some(&cookie), cash_sale(&soap, 2))).await;
    send(&app, post_json("/api/sales", Some(&cookie), cash_sale(&soap, 1))).await;

    let (status, _, body) = send(&app, get("/api/reports/daily", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["summary"]["sale_count"], 2);
    assert_eq!(body["summary"]["item_count"], 3);
    assert_eq!(body["summary"]["gross_total"], 2160 + 1080);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_report_rejects_inverted_range() {
    let app = setup().await;
    let cookie = login(&app, "bob").await;

    let (status, _, _) = send(
        &app,
        get("/api/reports/sales?from=2024-02-01&to=2024-01-01", Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_report_storage_failure_is_reported_inline() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 10).await;
    let cookie = login(&app, "bob").await;
    send(&app, post_json("/api/sales", Some(&cookie), cash_sale(&soap, 1))).await;

    sqlx::query("DROP TABLE sale_items")
        .execute(app.state.db.pool())
        .await
        .unwrap();

    let (status, _, body) = send(&app, get("/api/reports/daily", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["sales"].as_array().unwrap().is_empty());
    assert_eq!(body["summary"]["sale_count"], 0);
    assert!(body["error"].is_string());
}

// =============================================================================
// Drawer, activity, feedback
// =============================================================================

#[tokio::test]
async fn test_drawer_cannot_open_twice() {
    let app = setup().await;
    let cookie = login(&app, "bob").await;

    let (status, _, _) = send(
        &app,
        post_json("/api/drawer/open", Some(&cookie), json!({ "opening_float": 5000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(
        &app,
        post_json("/api/drawer/open", Some(&cookie), json!({ "opening_float": 5000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_drawer_close_reports_variance() {
    let app = setup().await;
    let soap = add_product(&app, "SOAP-1", "Hand Soap", 1000, 10).await;
    let cookie = login(&app, "bob").await;

    send(
        &app,
        post_json("/api/drawer/open", Some(&cookie), json!({ "opening_float": 5000 })),
    )
    .await;
    send(&app, post_json("/api/sales/checkout", Some(&cookie), cash_sale(&soap, 1))).await;

    let (status, _, body) = send(
        &app,
        post_json("/api/drawer/close", Some(&cookie), json!({ "counted_cash": 6000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["expected"], 6080);
    assert_eq!(body["data"]["variance"], -80);

    let (status, _, _) = send(
        &app,
        post_json("/api/drawer/close", Some(&cookie), json!({ "counted_cash": 6000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_activity_list_is_admin_only() {
    let app = setup().await;

    let cashier = login(&app, "bob").await;
    let (status, _, _) = send(
        &app,
        post_json("/api/activity", Some(&cashier), json!({ "action_type": "cart_cleared" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&app, get("/api/activity", Some(&cashier))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let admin = login(&app, "alice").await;
    let (status, _, body) = send(&app, get("/api/activity", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["action_type"].as_str())
        .collect();
    assert!(actions.contains(&"cart_cleared"));
    assert!(actions.contains(&"login"));
}

#[tokio::test]
async fn test_feedback_is_mailed_when_recipient_set() {
    let mut config = ServerConfig::for_tests();
    config.feedback.recipient = Some("owner@example.com".to_string());
    let app = setup_with(config).await;
    let cookie = login(&app, "bob").await;

    let (status, _, body) = send(
        &app,
        post_json(
            "/api/feedback",
            Some(&cookie),
            json!({ "subject": "Scanner", "message": "Beeps twice", "rating": 4 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mailed"], true);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "owner@example.com");
    assert!(sent[0].subject.contains("Scanner"));
    assert!(sent[0].body.contains("Beeps twice"));
}

#[tokio::test]
async fn test_feedback_without_recipient_is_only_stored() {
    let app = setup().await;
    let cookie = login(&app, "bob").await;

    let (status, _, body) = send(
        &app,
        post_json(
            "/api/feedback",
            Some(&cookie),
            json!({ "subject": "Receipts", "message": "Paper runs out fast" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mailed"], false);
    assert!(app.mailer.sent().is_empty());
}
