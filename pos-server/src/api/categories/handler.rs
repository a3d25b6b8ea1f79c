//! Category handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Category, CategoryCreate, CategoryUpdate};

use crate::api::ValidatedJson;
use crate::core::ServerState;
use crate::db::repository::{RepoError, category};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// GET /api/categories?active_only=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    Ok(ok(category::find_all(&state.pool, query.active_only).await?))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let found = category::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
    Ok(ok(found))
}

/// POST /api/categories
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<CategoryCreate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let created = category::create(&state.pool, &payload)
        .await
        .map_err(map_repo_error)?;
    Ok(ok(created))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let updated = category::update(&state.pool, id, &payload)
        .await
        .map_err(map_repo_error)?;
    Ok(ok(updated))
}

/// DELETE /api/categories/{id} - 仍有菜品时拒绝
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let items = category::count_items(&state.pool, id).await?;
    if items > 0 {
        return Err(AppError::new(ErrorCode::CategoryHasItems).with_detail("items", items));
    }
    if !category::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::CategoryNotFound));
    }
    Ok(ok(true))
}

fn map_repo_error(e: RepoError) -> AppError {
    match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::CategoryNameExists),
        RepoError::NotFound(_) => AppError::new(ErrorCode::CategoryNotFound),
        other => other.into(),
    }
}
