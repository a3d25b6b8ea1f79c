//! 扫码点餐 API (顾客)
//!
//! `/api/guest/sessions/init` 与 `/api/guest/menu` 公开，
//! 其余路由经过桌台会话网关，处理器从 [`Guest`](crate::auth::extractor::Guest) 取会话。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_table_session;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/guest", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let public_routes = Router::new()
        .route("/sessions/init", post(handler::init_session))
        .route("/menu", get(handler::menu));

    let session_routes = Router::new()
        .route("/session", get(handler::current_session))
        .route("/orders", get(handler::list_orders).post(handler::create_order))
        .route("/orders/{id}", get(handler::get_order))
        .route("/orders/{id}/items", post(handler::add_items))
        .route("/requests", post(handler::create_request))
        .route("/bill", get(handler::bill))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_table_session,
        ));

    public_routes.merge(session_routes)
}
