//! HTTP 层: 完整中间件栈上的 oneshot 请求

mod common;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use pos_server::ServerState;
use pos_server::auth::{SESSION_ID_HEADER, SESSION_SECRET_HEADER};
use pos_server::routes::build_app;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(state: &ServerState) -> Router {
    build_app(state).with_state(state.clone())
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.expect("infallible");
    let status = res.status();
    let bytes = res
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn test_health_is_public() {
    let state = common::state().await;
    let res = app(&state).oneshot(get("/health")).await.expect("infallible");
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let (_, body) = send(app(&state), get("/health")).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "ok");
}

#[tokio::test]
async fn test_staff_routes_require_token() {
    let state = common::state().await;
    let (status, body) = send(app(&state), get("/api/orders")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let req = Request::builder()
        .uri("/api/orders")
        .header(header::AUTHORIZATION, "Bearer garbage")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(app(&state), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_then_list_tables() {
    let fx = common::fixture().await;
    let state = &fx.state;

    let (status, _) = send(
        app(state),
        json_request(
            "POST",
            "/api/auth/login",
            json!({ "username": "admin", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        app(state),
        json_request(
            "POST",
            "/api/auth/login",
            json!({ "username": "admin", "password": "admin123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().expect("token").to_string();
    assert_eq!(body["data"]["user"]["username"], "admin");

    let req = Request::builder()
        .uri("/api/tables")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(app(state), req).await;
    assert_eq!(status, StatusCode::OK);
    let tables = body["data"].as_array().expect("table list");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["name"], "Table 5");
}

#[tokio::test]
async fn test_validation_errors_are_400() {
    let state = common::state().await;
    let token = common::admin_token(&state);

    let req = Request::builder()
        .method("POST")
        .uri("/api/categories")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "" }).to_string()))
        .expect("request");
    let (status, _) = send(app(&state), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_guest_gate() {
    let fx = common::fixture().await;
    let state = &fx.state;

    // 公开菜单
    let (status, body) = send(app(state), get("/api/guest/menu")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));

    // 无凭证
    let (status, _) = send(app(state), get("/api/guest/session")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let qr = state.sessions.issue_table_qr(fx.table.id).await.expect("qr");
    let (status, body) = send(
        app(state),
        json_request(
            "POST",
            "/api/guest/sessions/init",
            json!({ "token": qr.token, "customer_count": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["data"]["session"]["id"].as_i64().expect("session id");
    let secret = body["data"]["secret"].as_str().expect("secret").to_string();
    assert!(body["data"]["session"].get("secret_hash").is_none());

    let guest = |uri: &str, secret: &str| {
        Request::builder()
            .uri(uri)
            .header(SESSION_ID_HEADER, session_id.to_string())
            .header(SESSION_SECRET_HEADER, secret)
            .body(Body::empty())
            .expect("request")
    };

    let (status, _) = send(app(state), guest("/api/guest/session", "wrong-secret")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(app(state), guest("/api/guest/session", &secret)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["table_name"], "Table 5");

    let req = Request::builder()
        .method("POST")
        .uri("/api/guest/orders")
        .header(SESSION_ID_HEADER, session_id.to_string())
        .header(SESSION_SECRET_HEADER, &secret)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "items": [{ "menu_item_id": fx.tea.id, "quantity": 2 }] }).to_string(),
        ))
        .expect("request");
    let (status, body) = send(app(state), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));

    let (status, body) = send(app(state), guest("/api/guest/bill", &secret)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subtotal"], 6.0);

    // 关台后凭证失效
    state
        .sessions
        .close(session_id, None)
        .await
        .expect("close");
    let (status, _) = send(app(state), guest("/api/guest/session", &secret)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_requires_api_key_when_configured() {
    let mut config = pos_server::Config::for_tests();
    config.bank_webhook_api_key = Some("hook-key".into());
    let state = ServerState::initialize(&config).await.expect("state");

    let payload = json!({
        "id": 1,
        "gateway": "MBBank",
        "transactionDate": "2026-10-19 09:00:00",
        "accountNumber": "0001",
        "content": "no id here",
        "transferType": "in",
        "transferAmount": 10.0,
        "accumulated": 10.0
    });

    let (status, _) = send(
        app(&state),
        json_request("POST", "/api/webhooks/bank-transfer", payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("POST")
        .uri("/api/webhooks/bank-transfer")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Apikey hook-key")
        .body(Body::from(payload.to_string()))
        .expect("request");
    let (status, _) = send(app(&state), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_open_session_is_rejected() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;

    let guest = || {
        Request::builder()
            .uri("/api/guest/session")
            .header(SESSION_ID_HEADER, opened.session.id.to_string())
            .header(SESSION_SECRET_HEADER, &opened.secret)
            .body(Body::empty())
            .expect("request")
    };
    let (status, _) = send(app(state), guest()).await;
    assert_eq!(status, StatusCode::OK);

    // 会话仍是 OPEN，只是过了有效期
    sqlx::query("UPDATE table_sessions SET expires_at = ? WHERE id = ?")
        .bind(shared::util::now_millis() - 1_000)
        .bind(opened.session.id)
        .execute(&state.pool)
        .await
        .expect("expire session");

    let (status, body) = send(app(state), guest()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], shared::ErrorCode::SessionExpired.code());

    let detail = state.sessions.get(opened.session.id).await.expect("session");
    assert_eq!(detail.session.status, shared::models::SessionStatus::Open);
}
