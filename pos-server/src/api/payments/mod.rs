//! Payment API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}/process", post(handler::process))
        .route("/{id}/fail", post(handler::fail))
        .route("/bank-transfers", get(handler::bank_transfers))
        .layer(middleware::from_fn(require_permission("payments:manage")));

    let refund_routes = Router::new()
        .route("/{id}/refund", post(handler::refund))
        .layer(middleware::from_fn(require_permission("payments:refund")));

    read_routes.merge(manage_routes).merge(refund_routes)
}
