//! Forward-only status state machines
//!
//! 每个状态枚举给出一张显式的 `allowed_next` 表，转换函数是纯函数，
//! 持久化层只负责用条件 UPDATE 落地 (`WHERE status = <current>`).

use crate::error::{AppError, ErrorCode};
use thiserror::Error;

/// Rejected status change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} status cannot change from {from} to {to}")]
pub struct TransitionError {
    pub entity: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError::with_message(ErrorCode::InvalidStatusTransition, err.to_string())
            .with_detail("from", err.from)
            .with_detail("to", err.to)
    }
}

/// A status enum with an explicit transition table
pub trait StatusMachine: Copy + PartialEq + Sized + 'static {
    /// Entity name used in error messages
    const ENTITY: &'static str;

    /// Wire / storage name of the status
    fn as_str(&self) -> &'static str;

    /// States reachable from `self` in one step
    fn allowed_next(&self) -> &'static [Self];

    fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    fn can_transition_to(&self, next: Self) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Validate `self -> next`, returning `next` on success
    fn transition_to(&self, next: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                entity: Self::ENTITY,
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }
}
