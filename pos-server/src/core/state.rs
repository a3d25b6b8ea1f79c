//! 服务器状态
//!
//! [`ServerState`] 持有连接池和各业务服务，所有字段都是廉价克隆
//! (`SqlitePool` / `Arc`)，axum 每个请求克隆一份。

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::notifications::{NotificationHub, NotificationService};
use crate::orders::OrderService;
use crate::payments::PaymentService;
use crate::reservations::ReservationService;
use crate::sessions::SessionService;

#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub notifications: NotificationService,
    pub sessions: SessionService,
    pub orders: OrderService,
    pub payments: PaymentService,
    pub reservations: ReservationService,
}

impl ServerState {
    /// 由已打开的数据库组装服务
    pub fn new(config: Config, db: DbService) -> Self {
        let pool = db.pool;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let notifications = NotificationService::new(pool.clone(), Arc::new(NotificationHub::default()));
        let orders = OrderService::new(pool.clone(), notifications.clone(), config.tax_rate);
        let sessions = SessionService::new(
            pool.clone(),
            jwt_service.clone(),
            config.clone(),
            orders.clone(),
        );
        let payments = PaymentService::new(pool.clone(), notifications.clone());
        let reservations = ReservationService::new(pool.clone(), notifications.clone());

        Self {
            config,
            pool,
            jwt_service,
            notifications,
            sessions,
            orders,
            payments,
            reservations,
        }
    }

    /// 打开数据库、执行迁移、写入内置角色和管理员
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_path).await?;
        db.seed(&config.admin_username, &config.admin_password).await?;

        tracing::info!(
            tax_rate = config.tax_rate,
            session_ttl_minutes = config.session_ttl_minutes,
            webhook_key_configured = config.bank_webhook_api_key.is_some(),
            "Server state initialized"
        );
        Ok(Self::new(config.clone(), db))
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
