//! Role handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Role, RoleCreate, RoleUpdate};

use crate::api::ValidatedJson;
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::auth::permissions::{ALL_PERMISSIONS, is_valid_permission};
use crate::core::ServerState;
use crate::db::repository::{RepoError, role};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// GET /api/roles
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Role>>>> {
    Ok(ok(role::find_all(&state.pool).await?))
}

/// GET /api/roles/permissions - 可分配的权限列表
pub async fn permissions() -> Json<ApiResponse<Vec<&'static str>>> {
    ok(ALL_PERMISSIONS.to_vec())
}

/// GET /api/roles/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Role>>> {
    Ok(ok(find(&state, id).await?))
}

/// POST /api/roles
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(mut payload): ValidatedJson<RoleCreate>,
) -> AppResult<Json<ApiResponse<Role>>> {
    payload.name = payload.name.trim().to_string();
    check_permissions(&current, &payload.permissions)?;

    let created = role::create(&state.pool, &payload)
        .await
        .map_err(map_repo_error)?;
    audit_log!(current.id, "role_created", format!("role:{}", created.id), created.name);
    Ok(ok(created))
}

/// PUT /api/roles/{id}
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(mut payload): ValidatedJson<RoleUpdate>,
) -> AppResult<Json<ApiResponse<Role>>> {
    let existing = find(&state, id).await?;
    if existing.is_system
        && (payload.name.is_some() || payload.permissions.is_some() || payload.is_active == Some(false))
    {
        return Err(AppError::new(ErrorCode::RoleIsSystem));
    }
    if let Some(perms) = payload.permissions.as_deref() {
        check_permissions(&current, perms)?;
    }
    payload.name = payload.name.map(|n| n.trim().to_string());

    let updated = role::update(&state.pool, id, &payload)
        .await
        .map_err(map_repo_error)?;
    audit_log!(current.id, "role_updated", format!("role:{id}"));
    Ok(ok(updated))
}

/// DELETE /api/roles/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let existing = find(&state, id).await?;
    if existing.is_system {
        return Err(AppError::new(ErrorCode::RoleIsSystem));
    }
    let in_use = role::count_users(&state.pool, id).await?;
    if in_use > 0 {
        return Err(AppError::new(ErrorCode::RoleInUse).with_detail("users", in_use));
    }

    let deleted = role::delete(&state.pool, id).await?;
    audit_log!(current.id, "role_deleted", format!("role:{id}"), existing.name);
    Ok(ok(deleted))
}

/// 权限必须已知，且不能超出操作者自身权限
fn check_permissions(current: &CurrentUser, permissions: &[String]) -> AppResult<()> {
    for p in permissions {
        if !is_valid_permission(p) {
            return Err(AppError::validation(format!("Unknown permission: {p}"))
                .with_detail("permission", p.as_str()));
        }
        if !current.has_permission(p) {
            return Err(AppError::permission_denied(format!("Cannot grant permission: {p}"))
                .with_detail("permission", p.as_str()));
        }
    }
    Ok(())
}

async fn find(state: &ServerState, id: i64) -> AppResult<Role> {
    role::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RoleNotFound))
}

fn map_repo_error(e: RepoError) -> AppError {
    match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::RoleNameExists),
        RepoError::NotFound(_) => AppError::new(ErrorCode::RoleNotFound),
        other => other.into(),
    }
}
