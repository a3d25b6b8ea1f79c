//! 桌台会话
//!
//! 扫码开台 → 点餐 → 结账 → 关台。会话密钥只在开台时返回一次，
//! 之后顾客请求由 [`require_table_session`](crate::auth::require_table_session) 校验。

mod service;

pub use service::SessionService;
