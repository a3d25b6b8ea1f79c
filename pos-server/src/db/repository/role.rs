//! Role Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, RoleCreate, RoleUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, description, permissions, is_system, is_active";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(&format!("SELECT {COLUMNS} FROM roles ORDER BY name"))
        .fetch_all(pool)
        .await?;
    Ok(roles)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!("SELECT {COLUMNS} FROM roles WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {COLUMNS} FROM roles WHERE name = ? LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

fn permissions_json(permissions: &[String]) -> RepoResult<String> {
    serde_json::to_string(permissions)
        .map_err(|e| RepoError::Database(format!("Failed to serialize permissions: {e}")))
}

pub async fn create(pool: &SqlitePool, data: &RoleCreate) -> RepoResult<Role> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "INSERT INTO roles (name, description, permissions) VALUES (?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(&data.name)
    .bind(&data.description)
    .bind(permissions_json(&data.permissions)?)
    .fetch_one(pool)
    .await?;
    Ok(role)
}

/// Insert a built-in role if missing (startup seeding)
pub async fn ensure_system_role(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    permissions: &[String],
) -> RepoResult<Role> {
    sqlx::query(
        "INSERT INTO roles (name, description, permissions, is_system) VALUES (?, ?, ?, 1) ON CONFLICT(name) DO NOTHING",
    )
    .bind(name)
    .bind(description)
    .bind(permissions_json(permissions)?)
    .execute(pool)
    .await?;

    find_by_name(pool, name)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Failed to seed role {name}")))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &RoleUpdate) -> RepoResult<Role> {
    let permissions = data
        .permissions
        .as_deref()
        .map(permissions_json)
        .transpose()?;

    let rows = sqlx::query(
        "UPDATE roles SET name = COALESCE(?1, name), description = COALESCE(?2, description), permissions = COALESCE(?3, permissions), is_active = COALESCE(?4, is_active) WHERE id = ?5",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(permissions)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Role {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {id} not found")))
}

/// Number of users assigned to the role
pub async fn count_users(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM roles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
