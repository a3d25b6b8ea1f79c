//! Kitchen display API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/kitchen", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new().route("/queue", get(handler::queue));

    let manage_routes = Router::new()
        .route("/items/{id}/status", patch(handler::update_item_status))
        .layer(middleware::from_fn(require_permission("kitchen:manage")));

    read_routes.merge(manage_routes)
}
