//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};
use shared::models::{LoginRequest, LoginResponse, Role, User, UserInfo};

use crate::api::ValidatedJson;
use crate::auth::CurrentUser;
use crate::auth::password::verify_password;
use crate::core::ServerState;
use crate::db::repository::{role, user};
use crate::security_log;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// 固定延迟，用户不存在与密码错误耗时一致
const AUTH_FIXED_DELAY_MS: u64 = 300;

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let username = req.username.trim().to_string();
    let record = user::find_record_by_username(&state.pool, &username).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let Some(record) = record else {
        security_log!(WARN, "login_failed", username = %username, reason = "user_not_found");
        return Err(AppError::invalid_credentials());
    };

    let password_valid = verify_password(&req.password, &record.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        security_log!(WARN, "login_failed", username = %username, reason = "invalid_password");
        return Err(AppError::invalid_credentials());
    }
    if !record.is_active {
        security_log!(WARN, "login_failed", username = %username, reason = "account_disabled");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let role = active_role(&state, record.role_id).await?;

    let jwt = state.get_jwt_service();
    let token = jwt
        .generate_token(record.id, &record.username, &role.name, &role.permissions)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        user_id = record.id,
        username = %record.username,
        role = %role.name,
        "User logged in"
    );

    Ok(ok(LoginResponse {
        token,
        expires_in: jwt.config.expiration_minutes * 60,
        user: UserInfo {
            id: record.id,
            username: record.username,
            display_name: record.display_name,
            role_id: role.id,
            role_name: role.name,
            permissions: role.permissions,
            is_system: record.is_system,
        },
    }))
}

/// GET /api/auth/me
///
/// 以数据库为准 (令牌签发后角色可能已变更)
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let found: User = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    let role = active_role(&state, found.role_id).await?;

    Ok(ok(UserInfo {
        id: found.id,
        username: found.username,
        display_name: found.display_name,
        role_id: role.id,
        role_name: role.name,
        permissions: role.permissions,
        is_system: found.is_system,
    }))
}

async fn active_role(state: &ServerState, role_id: i64) -> AppResult<Role> {
    let role = role::find_by_id(&state.pool, role_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RoleNotFound))?;
    if !role.is_active {
        return Err(AppError::permission_denied("Role has been disabled"));
    }
    Ok(role)
}
