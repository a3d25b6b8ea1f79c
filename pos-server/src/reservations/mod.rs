//! 桌台预订

mod service;

pub use service::ReservationService;
