//! 支付处理
//!
//! - [`PaymentService`] 创建、确认、退款、标记失败
//! - [`webhook`] 银行转账回调对账
//!
//! 交易号格式见 [`shared::transaction_id`]。

mod service;
pub mod webhook;

pub use service::PaymentService;
