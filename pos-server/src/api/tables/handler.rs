//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableStatus, DiningTableUpdate, TableQrCode,
};

use crate::api::ValidatedJson;
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, dining_table};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// GET /api/tables - 全部桌台及占用状态
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<DiningTableStatus>>>> {
    let tables = dining_table::find_all_with_status(&state.pool, shared::util::now_millis()).await?;
    Ok(ok(tables))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = dining_table::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
    Ok(ok(table))
}

/// POST /api/tables
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<DiningTableCreate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = dining_table::create(&state.pool, &payload, shared::util::now_millis())
        .await
        .map_err(map_repo_error)?;
    tracing::info!(table_id = table.id, name = %table.name, "Table created");
    Ok(ok(table))
}

/// PUT /api/tables/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<DiningTableUpdate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = dining_table::update(&state.pool, id, &payload, shared::util::now_millis())
        .await
        .map_err(map_repo_error)?;
    Ok(ok(table))
}

/// DELETE /api/tables/{id}
///
/// 有会话或预订记录的桌台只能停用 (`is_active = false`)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if dining_table::has_history(&state.pool, id).await? {
        return Err(AppError::with_message(
            ErrorCode::TableHasOpenSession,
            "Table has session or reservation history, deactivate it instead",
        ));
    }
    if !dining_table::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::TableNotFound));
    }
    Ok(ok(true))
}

/// POST /api/tables/{id}/qr - 签发扫码点餐令牌与链接
pub async fn issue_qr(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<TableQrCode>>> {
    let qr = state.sessions.issue_table_qr(id).await?;
    audit_log!(current.id, "table_qr_issued", format!("table:{id}"));
    Ok(ok(qr))
}

fn map_repo_error(e: RepoError) -> AppError {
    match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::TableNameExists),
        RepoError::NotFound(_) => AppError::new(ErrorCode::TableNotFound),
        other => other.into(),
    }
}
