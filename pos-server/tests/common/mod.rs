//! 集成测试公共夹具: 内存数据库 + 一张桌 + 两道菜
#![allow(dead_code)]

use pos_server::db::repository::{category, dining_table, menu_item};
use pos_server::{Config, ServerState};
use shared::models::{
    CategoryCreate, DiningTable, DiningTableCreate, MenuItem, MenuItemCreate, SessionInit,
    SessionInitResponse,
};

pub struct Fixture {
    pub state: ServerState,
    pub table: DiningTable,
    pub noodles: MenuItem,
    pub tea: MenuItem,
}

pub async fn state() -> ServerState {
    ServerState::initialize(&Config::for_tests())
        .await
        .expect("state should initialize")
}

/// 文件数据库 (多连接)，用于并发场景
pub async fn file_state(dir: &tempfile::TempDir) -> ServerState {
    let mut config = Config::for_tests();
    config.database_path = dir.path().join("pos.db").to_string_lossy().into_owned();
    ServerState::initialize(&config)
        .await
        .expect("state should initialize")
}

pub async fn fixture() -> Fixture {
    seed_catalog(state().await).await
}

pub async fn seed_catalog(state: ServerState) -> Fixture {
    let now = shared::util::now_millis();
    let table = dining_table::create(
        &state.pool,
        &DiningTableCreate {
            name: "Table 5".into(),
            capacity: Some(4),
            location: Some("Window".into()),
        },
        now,
    )
    .await
    .expect("table");

    let mains = category::create(
        &state.pool,
        &CategoryCreate {
            name: "Mains".into(),
            description: None,
            sort_order: Some(1),
        },
    )
    .await
    .expect("category");

    let noodles = menu_item::create(
        &state.pool,
        &MenuItemCreate {
            name: "Beef Noodles".into(),
            description: Some("House broth".into()),
            price: 12.5,
            category_id: mains.id,
            image_url: None,
            is_available: Some(true),
        },
        now,
    )
    .await
    .expect("menu item");

    let tea = menu_item::create(
        &state.pool,
        &MenuItemCreate {
            name: "Iced Tea".into(),
            description: None,
            price: 3.0,
            category_id: mains.id,
            image_url: None,
            is_available: Some(true),
        },
        now,
    )
    .await
    .expect("menu item");

    Fixture {
        state,
        table,
        noodles,
        tea,
    }
}

/// 扫码开台
pub async fn open_session(state: &ServerState, table_id: i64) -> SessionInitResponse {
    let qr = state
        .sessions
        .issue_table_qr(table_id)
        .await
        .expect("qr token");
    state
        .sessions
        .init(SessionInit {
            token: qr.token,
            customer_count: Some(2),
            notes: None,
        })
        .await
        .expect("session should open")
}

/// 管理员 JWT (seed 写入的 admin)
pub fn admin_token(state: &ServerState) -> String {
    state
        .jwt_service
        .generate_token(1, "admin", "admin", &["all".to_string()])
        .expect("token")
}
