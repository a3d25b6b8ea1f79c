//! Inbound webhooks (API key, no staff token)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/webhooks/bank-transfer", post(handler::bank_transfer))
}
