//! 认证中间件
//!
//! 员工 JWT 认证与权限检查

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

/// 不需要员工令牌的 API 前缀
///
/// - `/api/auth/login` 登录
/// - `/api/guest/` 顾客扫码点餐 (由桌台会话网关保护)
/// - `/api/webhooks/` 银行回调 (API Key)
/// - `/api/notifications/ws` websocket 握手自行校验令牌
const PUBLIC_API_PREFIXES: &[&str] = &[
    "/api/auth/login",
    "/api/guest/",
    "/api/webhooks/",
    "/api/notifications/ws",
];

pub fn is_public_api_route(path: &str) -> bool {
    PUBLIC_API_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// 认证中间件 - 要求员工登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
/// 成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (`/health`、404)
/// - [`PUBLIC_API_PREFIXES`]
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 NotAuthenticated |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || is_public_api_route(path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!(WARN, "auth_missing", uri = %req.uri());
            return Err(AppError::not_authenticated());
        }
    };

    let user = authenticate_token(&state.get_jwt_service(), token, req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 校验员工令牌并解析为 [`CurrentUser`]
pub(crate) fn authenticate_token(
    jwt_service: &JwtService,
    token: &str,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let claims = jwt_service.validate_token(token).map_err(|e| {
        security_log!(WARN, "auth_failed", error = %e, uri = %uri);
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))
}

/// 权限检查中间件 - 要求特定权限
///
/// 支持通配符 `"orders:*"`，`"all"` 匹配所有权限。
///
/// ```ignore
/// Router::new()
///     .route("/api/payments/{id}/refund", post(handler::refund))
///     .layer(middleware::from_fn(require_permission("payments:refund")));
/// ```
///
/// 无权限返回 403 PermissionDenied
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req.current_user()?;

            if !user.has_permission(permission) {
                security_log!(
                    WARN,
                    "permission_denied",
                    user_id = user.id,
                    username = %user.username,
                    required_permission = permission
                );
                return Err(AppError::permission_denied(format!(
                    "Permission denied: {permission}"
                ))
                .with_detail("required_permission", permission));
            }

            Ok(next.run(req).await)
        })
    }
}

/// 管理员中间件 - 要求 admin 角色
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.current_user()?;
    if !user.is_admin() {
        security_log!(
            WARN,
            "admin_required",
            user_id = user.id,
            username = %user.username,
            user_role = %user.role
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

/// 从请求中提取 CurrentUser 的扩展方法
pub trait CurrentUserExt {
    /// 未认证返回 401
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or_else(AppError::not_authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_routes() {
        assert!(is_public_api_route("/api/auth/login"));
        assert!(is_public_api_route("/api/guest/sessions/init"));
        assert!(is_public_api_route("/api/webhooks/bank-transfer"));
        assert!(is_public_api_route("/api/notifications/ws"));
        assert!(!is_public_api_route("/api/auth/me"));
        assert!(!is_public_api_route("/api/notifications"));
        assert!(!is_public_api_route("/api/orders"));
    }
}
