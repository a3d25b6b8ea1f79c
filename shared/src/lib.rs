//! Shared types for the POS workspace
//!
//! Domain models, status state machines, the unified error system and the
//! websocket event types used by `pos-server` and its clients.

pub mod error;
pub mod lifecycle;
pub mod message;
pub mod models;
pub mod pagination;
pub mod transaction_id;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use lifecycle::{StatusMachine, TransitionError};
pub use message::{ClientEvent, ServerEvent};
pub use pagination::{PageQuery, PaginatedResponse};
