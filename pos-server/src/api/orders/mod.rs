//! Order API (staff)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/bill", get(handler::bill));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}/items", post(handler::add_items))
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_permission("orders:manage")));

    read_routes.merge(manage_routes)
}
