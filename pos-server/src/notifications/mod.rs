//! 通知中心
//!
//! - [`NotificationService`] 持久化通知 (每个接收人一行) 并推送
//! - [`NotificationHub`] 在线 websocket 连接表
//!
//! 推送是尽力而为，离线用户通过 `GET /api/notifications` 拉取。

mod hub;
mod service;

pub use hub::NotificationHub;
pub use service::NotificationService;
