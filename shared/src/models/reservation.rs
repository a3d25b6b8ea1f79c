//! Reservation Model

use crate::lifecycle::StatusMachine;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 预订状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl StatusMachine for ReservationStatus {
    const ENTITY: &'static str = "reservation";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::NoShow => "NO_SHOW",
        }
    }

    fn allowed_next(&self) -> &'static [Self] {
        use ReservationStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled, NoShow],
            Confirmed => &[Completed, Cancelled, NoShow],
            Completed | Cancelled | NoShow => &[],
        }
    }
}

impl ReservationStatus {
    /// Still holds the table slot
    pub fn blocks_table(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub table_id: i64,
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: String,
    pub party_size: i32,
    /// Start time (Unix millis)
    pub reserved_at: i64,
    pub duration_minutes: i32,
    pub notes: Option<String>,
    pub status: ReservationStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Reservation {
    pub fn ends_at(&self) -> i64 {
        self.reserved_at + i64::from(self.duration_minutes) * 60_000
    }
}

fn default_duration() -> i32 {
    120
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReservationCreate {
    pub table_id: i64,
    pub customer_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub customer_name: String,
    #[validate(length(min = 3, max = 100))]
    pub customer_phone: String,
    #[validate(range(min = 1, max = 100))]
    pub party_size: i32,
    pub reserved_at: i64,
    #[serde(default = "default_duration")]
    #[validate(range(min = 15, max = 720))]
    pub duration_minutes: i32,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Update reservation payload (status changes go through the status endpoint)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReservationUpdate {
    pub table_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub customer_name: Option<String>,
    #[validate(length(min = 3, max = 100))]
    pub customer_phone: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub party_size: Option<i32>,
    pub reserved_at: Option<i64>,
    #[validate(range(min = 15, max = 720))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Reservation status change
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReservationStatusUpdate {
    pub status: ReservationStatus,
}

/// Reservation list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub table_id: Option<i64>,
    /// reserved_at >= from
    pub from: Option<i64>,
    /// reserved_at < to
    pub to: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_edges() {
        use ReservationStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(NoShow));
        assert!(!Pending.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(NoShow.is_terminal());
    }

    #[test]
    fn test_blocks_table() {
        assert!(ReservationStatus::Confirmed.blocks_table());
        assert!(!ReservationStatus::Cancelled.blocks_table());
    }
}
