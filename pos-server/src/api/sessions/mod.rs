//! Table session API (staff)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sessions", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/orders", get(handler::orders))
        .route("/{id}/bill", get(handler::bill));

    let manage_routes = Router::new()
        .route("/{id}", axum::routing::put(handler::update))
        .route("/{id}/close", post(handler::close))
        .layer(middleware::from_fn(require_permission("sessions:manage")));

    read_routes.merge(manage_routes)
}
