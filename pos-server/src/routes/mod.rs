//! 路由与中间件组装

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue, StatusCode};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::auth::require_auth;
use crate::core::ServerState;
use crate::middleware::logging_middleware;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// UUID v4 request id
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// 注册全部路由 (无全局中间件)
///
/// 权限层在各模块 `router()` 内按路由组挂载；顾客路由挂桌台会话网关，
/// 需要 state 构造 `from_fn_with_state`。
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(api::health::router())
        .merge(api::auth::router())
        // Staff
        .merge(api::users::router())
        .merge(api::roles::router())
        // Catalog & floor
        .merge(api::categories::router())
        .merge(api::menu_items::router())
        .merge(api::customers::router())
        .merge(api::tables::router())
        .merge(api::sessions::router())
        .merge(api::reservations::router())
        // Ordering
        .merge(api::orders::router())
        .merge(api::kitchen::router())
        .merge(api::guest::router(state))
        // Money
        .merge(api::payments::router())
        .merge(api::webhooks::router())
        .merge(api::notifications::router())
}

/// 完整应用: 路由 + 全局中间件
///
/// HTTP 服务器和测试 (`oneshot`) 共用
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router(state)
        // 在认证之内，能读到 CurrentUser；认证拒绝由 security 日志记录
        .layer(axum_middleware::from_fn(logging_middleware))
        // 员工认证 - 注入 CurrentUser，公开路由直接放行
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(state.config.request_timeout_ms),
        ))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // 最外层生成 request id
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}
