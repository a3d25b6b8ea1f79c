//! Data models
//!
//! Shared between pos-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all timestamps Unix millis.

pub mod bank_transfer;
pub mod category;
pub mod customer;
pub mod dining_table;
pub mod kitchen;
pub mod menu_item;
pub mod notification;
pub mod order;
pub mod payment;
pub mod reservation;
pub mod role;
pub mod table_session;
pub mod user;

// Re-exports
pub use bank_transfer::*;
pub use category::*;
pub use customer::*;
pub use dining_table::*;
pub use kitchen::*;
pub use menu_item::*;
pub use notification::*;
pub use order::*;
pub use payment::*;
pub use reservation::*;
pub use role::*;
pub use table_session::*;
pub use user::*;
