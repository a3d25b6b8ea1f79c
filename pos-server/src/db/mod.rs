//! Database Module
//!
//! SQLite connection pool, migrations and first-start seeding

pub mod repository;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::auth::password::hash_password;
use crate::auth::permissions::SYSTEM_ROLES;
use crate::utils::AppError;
use repository::{role, user};

const IN_MEMORY: &str = ":memory:";

/// Database service, owns the SQLite connection pool
#[derive(Clone, Debug)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database with WAL mode and apply migrations.
    ///
    /// `":memory:"` opens a private in-memory database on a single connection
    /// (every connection to `:memory:` would otherwise see its own database).
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let in_memory = db_path == IN_MEMORY;
        let url = if in_memory {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{db_path}")
        };

        let mut options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            // 写冲突时等待 5s 而非立即失败
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            // 内存库在最后一个连接关闭时消失
            .idle_timeout(if in_memory { None } else { Some(Duration::from_secs(600)) })
            .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(1800)) })
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!(path = %db_path, "Database connection established (SQLite, busy_timeout=5000ms)");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Seed built-in roles, and the admin account when no user exists yet
    pub async fn seed(&self, admin_username: &str, admin_password: &str) -> Result<(), AppError> {
        let mut admin_role_id = None;
        for (name, description, permissions) in SYSTEM_ROLES {
            let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
            let role = role::ensure_system_role(&self.pool, name, description, &permissions).await?;
            if *name == "admin" {
                admin_role_id = Some(role.id);
            }
        }

        if user::count(&self.pool).await? > 0 {
            return Ok(());
        }

        let role_id = admin_role_id.ok_or_else(|| AppError::internal("admin role missing"))?;
        let password_hash = hash_password(admin_password)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

        user::create(
            &self.pool,
            user::NewUser {
                username: admin_username,
                password_hash: &password_hash,
                display_name: "Administrator",
                role_id,
                is_system: true,
            },
            shared::util::now_millis(),
        )
        .await?;

        tracing::warn!(username = %admin_username, "Created initial admin account, change its password");
        Ok(())
    }
}
