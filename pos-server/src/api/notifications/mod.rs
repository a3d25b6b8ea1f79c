//! Notification API
//!
//! REST 查询/已读 + `/api/notifications/ws` 实时推送

mod handler;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/notifications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/unread-count", get(handler::unread_count))
        .route("/read-all", post(handler::mark_all_as_read))
        .route("/{id}/read", post(handler::mark_as_read))
        .route("/ws", get(ws::handle_notifications_ws))
}
