//! 认证授权模块
//!
//! - [`JwtService`] - 员工 JWT 与桌台二维码令牌
//! - [`CurrentUser`] - 当前员工上下文
//! - [`require_auth`] - 员工认证中间件
//! - [`require_permission`] - 权限检查中间件
//! - [`require_table_session`] - 顾客桌台会话网关
//! - [`password`] - Argon2 密码哈希

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod session_gate;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, TableQrClaims};
pub use middleware::{CurrentUserExt, require_admin, require_auth, require_permission};
pub use session_gate::{SESSION_ID_HEADER, SESSION_SECRET_HEADER, require_table_session};
