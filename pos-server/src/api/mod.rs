//! API 路由模块
//!
//! 每个子模块提供 `router()`，在 [`crate::routes::build_router`] 中合并。
//!
//! - [`health`] - 健康检查 (公开)
//! - [`auth`] - 登录 / 当前用户
//! - [`users`] / [`roles`] - 员工与角色 (admin)
//! - [`customers`] / [`categories`] / [`menu_items`] / [`tables`] - 基础资料
//! - [`sessions`] - 桌台会话 (员工)
//! - [`guest`] - 扫码点餐 (桌台会话网关)
//! - [`orders`] / [`kitchen`] - 订单与后厨
//! - [`payments`] / [`webhooks`] - 支付与银行回调
//! - [`reservations`] - 预订
//! - [`notifications`] - 通知中心与 websocket

pub mod extract;

pub mod auth;
pub mod health;

// Staff
pub mod roles;
pub mod users;

// Catalog & floor
pub mod categories;
pub mod customers;
pub mod menu_items;
pub mod reservations;
pub mod sessions;
pub mod tables;

// Ordering
pub mod guest;
pub mod kitchen;
pub mod orders;

// Money
pub mod payments;
pub mod webhooks;

pub mod notifications;

pub use extract::ValidatedJson;
