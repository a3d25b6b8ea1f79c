//! POS Server - 餐厅收银后台
//!
//! # 架构概述
//!
//! - **桌台会话** (`sessions`): 扫码开台、会话密钥、过期与关台
//! - **订单** (`orders`): 下单、加菜、订单/菜品状态机、账单
//! - **支付** (`payments`): 现金/刷卡/银行转账、退款、银行回调对账
//! - **通知** (`notifications`): 持久化 + websocket 推送
//! - **预订** (`reservations`): 预订与时段冲突检查
//! - **认证** (`auth`): 员工 JWT + Argon2，顾客走会话网关
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/           # 配置、状态、服务器
//! ├── auth/           # JWT、权限、会话网关
//! ├── db/             # SQLite 连接池与仓储
//! ├── sessions/       # 桌台会话
//! ├── orders/         # 订单与账单
//! ├── payments/       # 支付与银行回调
//! ├── notifications/  # 通知中心
//! ├── reservations/   # 预订
//! ├── routes/         # 路由与中间件组装
//! ├── middleware/     # 请求日志
//! ├── api/            # HTTP 处理器
//! └── utils/          # 日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod middleware;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod reservations;
pub mod routes;
pub mod sessions;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Audit log helper - records critical business operations (refunds, staff changes)
///
/// ```ignore
/// audit_log!(user.id, "refund", format!("payment:{id}"), reason);
/// ```
#[macro_export]
macro_rules! audit_log {
    ($user_id:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            user_id = $user_id,
            action = $action,
            resource = %$resource,
            "AUDIT"
        );
    };
    ($user_id:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            user_id = $user_id,
            action = $action,
            resource = %$resource,
            details = %$details,
            "AUDIT"
        );
    };
}

/// Security log helper - auth failures, permission denials, webhook rejections
///
/// ```ignore
/// security_log!(WARN, "auth_failed", username = %name, reason = "invalid_password");
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            $($arg)*
        );
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(
            target: "security",
            event = $event,
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            $($arg)*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____
   / __ \/ __ \/ ___/
  / /_/ / / / /\__ \
 / ____/ /_/ /___/ /
/_/    \____//____/
    "#
    );
}
