//! Staff account handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{User, UserCreate, UserUpdate};

use crate::api::ValidatedJson;
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::user::{self, NewUser, UserChanges};
use crate::db::repository::{RepoError, role};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// GET /api/users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    Ok(ok(user::find_all(&state.pool).await?))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(ok(find(&state, id).await?))
}

/// POST /api/users
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UserCreate>,
) -> AppResult<Json<ApiResponse<User>>> {
    ensure_role_exists(&state, payload.role_id).await?;
    let password_hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let created = user::create(
        &state.pool,
        NewUser {
            username: payload.username.trim(),
            password_hash: &password_hash,
            display_name: payload.display_name.trim(),
            role_id: payload.role_id,
            is_system: false,
        },
        shared::util::now_millis(),
    )
    .await
    .map_err(map_duplicate)?;

    audit_log!(current.id, "user_created", format!("user:{}", created.id), created.username);
    Ok(ok(created))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UserUpdate>,
) -> AppResult<Json<ApiResponse<User>>> {
    let existing = find(&state, id).await?;

    // 系统管理员不能被降级或停用
    if existing.is_system
        && (payload.role_id.is_some_and(|r| r != existing.role_id) || payload.is_active == Some(false))
    {
        return Err(AppError::new(ErrorCode::CannotModifyAdmin));
    }
    if id == current.id && payload.is_active == Some(false) {
        return Err(AppError::invalid_request("Cannot disable your own account"));
    }
    if let Some(role_id) = payload.role_id {
        ensure_role_exists(&state, role_id).await?;
    }

    let password_hash = payload
        .password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let updated = user::update(
        &state.pool,
        id,
        UserChanges {
            username: payload.username.map(|u| u.trim().to_string()),
            password_hash,
            display_name: payload.display_name.map(|d| d.trim().to_string()),
            role_id: payload.role_id,
            is_active: payload.is_active,
        },
        shared::util::now_millis(),
    )
    .await
    .map_err(map_duplicate)?;

    audit_log!(current.id, "user_updated", format!("user:{id}"));
    Ok(ok(updated))
}

/// DELETE /api/users/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if id == current.id {
        return Err(AppError::new(ErrorCode::UserCannotDeleteSelf));
    }
    let existing = find(&state, id).await?;
    if existing.is_system {
        return Err(AppError::new(ErrorCode::UserIsSystem));
    }

    let deleted = user::delete(&state.pool, id).await?;
    audit_log!(current.id, "user_deleted", format!("user:{id}"), existing.username);
    Ok(ok(deleted))
}

async fn find(state: &ServerState, id: i64) -> AppResult<User> {
    user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))
}

async fn ensure_role_exists(state: &ServerState, role_id: i64) -> AppResult<()> {
    role::find_by_id(&state.pool, role_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RoleNotFound))?;
    Ok(())
}

fn map_duplicate(e: RepoError) -> AppError {
    match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::UsernameExists),
        RepoError::NotFound(_) => AppError::new(ErrorCode::UserNotFound),
        other => other.into(),
    }
}
