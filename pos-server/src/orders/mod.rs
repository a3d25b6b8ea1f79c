//! 订单管理
//!
//! - [`OrderService`] 下单、加菜、订单/菜品状态机、厨房队列
//! - [`bill`] 读时计算账单
//! - [`money`] Decimal 金额运算

pub mod bill;
pub mod money;
mod service;

pub use service::OrderService;
