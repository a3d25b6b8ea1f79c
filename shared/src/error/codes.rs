//! Unified error codes for the POS workspace
//!
//! This module defines all error codes used across pos-server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Table session errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu errors
//! - 7xxx: Table and reservation errors
//! - 8xxx: User and customer errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Requested status change is not an edge of the state machine
    InvalidStatusTransition = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Table session has expired
    SessionExpired = 1005,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Session id/secret headers missing
    SessionCredentialsMissing = 1008,
    /// Session id/secret do not identify an open session
    SessionCredentialsInvalid = 1009,
    /// Webhook caller is not authorized
    WebhookUnauthorized = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Cannot modify admin user
    CannotModifyAdmin = 2004,
    /// Cannot delete admin user
    CannotDeleteAdmin = 2005,

    // ==================== 3xxx: Table Session ====================
    /// Table session not found
    SessionNotFound = 3001,
    /// Table session is not open
    SessionNotOpen = 3002,
    /// Table session is already closed
    SessionAlreadyClosed = 3003,
    /// QR token is invalid
    QrTokenInvalid = 3004,
    /// QR token has expired
    QrTokenExpired = 3005,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order item not found
    OrderItemNotFound = 4002,
    /// Order is empty
    OrderEmpty = 4003,
    /// Order has already been completed
    OrderAlreadyCompleted = 4004,
    /// Order has already been cancelled
    OrderAlreadyCancelled = 4005,
    /// Order still has items that are not served
    OrderHasUnservedItems = 4006,
    /// Order type and session do not agree
    OrderTypeMismatch = 4007,
    /// Item quantity is invalid
    InvalidQuantity = 4008,

    // ==================== 5xxx: Payment ====================
    /// Payment not found
    PaymentNotFound = 5001,
    /// total_amount != subtotal + tax - discount
    PaymentAmountMismatch = 5002,
    /// Payment is not pending
    PaymentNotPending = 5003,
    /// Payment is not paid
    PaymentNotPaid = 5004,
    /// Refund reason is required
    RefundReasonRequired = 5005,
    /// Transaction id has an invalid format
    TransactionIdInvalid = 5006,
    /// Transaction id does not match any payment
    TransactionIdUnmatched = 5007,
    /// Transfer amount does not match the payment total
    TransferAmountMismatch = 5008,
    /// Operation not allowed for this payment method
    PaymentMethodMismatch = 5009,
    /// Payment must reference a session or an order
    PaymentTargetRequired = 5010,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item is not available
    MenuItemUnavailable = 6002,
    /// Menu item has an invalid price
    MenuItemInvalidPrice = 6003,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category has menu items
    CategoryHasItems = 6102,
    /// Category name already exists
    CategoryNameExists = 6103,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is occupied by an open session
    TableOccupied = 7002,
    /// Table name already exists
    TableNameExists = 7003,
    /// Table is inactive
    TableInactive = 7004,
    /// Table has an open session
    TableHasOpenSession = 7005,
    /// Reservation not found
    ReservationNotFound = 7101,
    /// Reservation overlaps another reservation
    ReservationConflict = 7102,
    /// Party size exceeds table capacity
    PartySizeExceedsCapacity = 7103,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// Cannot delete self
    UserCannotDeleteSelf = 8003,
    /// Cannot modify/delete system user
    UserIsSystem = 8004,
    /// Role not found
    RoleNotFound = 8101,
    /// Role name already exists
    RoleNameExists = 8102,
    /// Role is in use
    RoleInUse = 8103,
    /// Cannot modify/delete system role
    RoleIsSystem = 8104,
    /// Customer not found
    CustomerNotFound = 8201,
    /// Customer phone already exists
    CustomerPhoneExists = 8202,
    /// Notification not found
    NotificationNotFound = 8301,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SessionExpired => "Table session has expired",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::SessionCredentialsMissing => "Session credentials are missing",
            ErrorCode::SessionCredentialsInvalid => "Session credentials are invalid",
            ErrorCode::WebhookUnauthorized => "Webhook caller is not authorized",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotModifyAdmin => "Cannot modify administrator",
            ErrorCode::CannotDeleteAdmin => "Cannot delete administrator",

            // Session
            ErrorCode::SessionNotFound => "Table session not found",
            ErrorCode::SessionNotOpen => "Table session is not open",
            ErrorCode::SessionAlreadyClosed => "Table session is already closed",
            ErrorCode::QrTokenInvalid => "QR token is invalid",
            ErrorCode::QrTokenExpired => "QR token has expired",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderAlreadyCancelled => "Order has already been cancelled",
            ErrorCode::OrderHasUnservedItems => "Order has items that are not served",
            ErrorCode::OrderTypeMismatch => "Order type does not match its session",
            ErrorCode::InvalidQuantity => "Quantity must be at least 1",

            // Payment
            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::PaymentAmountMismatch => "Total must equal subtotal + tax - discount",
            ErrorCode::PaymentNotPending => "Payment is not pending",
            ErrorCode::PaymentNotPaid => "Payment is not paid",
            ErrorCode::RefundReasonRequired => "Refund reason is required",
            ErrorCode::TransactionIdInvalid => "Transaction id format is invalid",
            ErrorCode::TransactionIdUnmatched => "Transaction id does not match a payment",
            ErrorCode::TransferAmountMismatch => "Transfer amount does not match the payment",
            ErrorCode::PaymentMethodMismatch => "Operation not allowed for this payment method",
            ErrorCode::PaymentTargetRequired => "Payment must reference a session or an order",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::MenuItemInvalidPrice => "Menu item price is invalid",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasItems => "Category has menu items",
            ErrorCode::CategoryNameExists => "Category name already exists",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableOccupied => "Table already has an open session",
            ErrorCode::TableNameExists => "Table name already exists",
            ErrorCode::TableInactive => "Table is inactive",
            ErrorCode::TableHasOpenSession => "Table has an open session",
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ReservationConflict => "Reservation overlaps an existing reservation",
            ErrorCode::PartySizeExceedsCapacity => "Party size exceeds table capacity",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::UserCannotDeleteSelf => "Cannot delete yourself",
            ErrorCode::UserIsSystem => "Cannot modify system user",
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleNameExists => "Role name already exists",
            ErrorCode::RoleInUse => "Role is in use",
            ErrorCode::RoleIsSystem => "Cannot modify system role",
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::CustomerPhoneExists => "Customer phone already exists",
            ErrorCode::NotificationNotFound => "Notification not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::InvalidStatusTransition),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SessionExpired),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::SessionCredentialsMissing),
            1009 => Ok(ErrorCode::SessionCredentialsInvalid),
            1010 => Ok(ErrorCode::WebhookUnauthorized),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::CannotModifyAdmin),
            2005 => Ok(ErrorCode::CannotDeleteAdmin),

            // Session
            3001 => Ok(ErrorCode::SessionNotFound),
            3002 => Ok(ErrorCode::SessionNotOpen),
            3003 => Ok(ErrorCode::SessionAlreadyClosed),
            3004 => Ok(ErrorCode::QrTokenInvalid),
            3005 => Ok(ErrorCode::QrTokenExpired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderItemNotFound),
            4003 => Ok(ErrorCode::OrderEmpty),
            4004 => Ok(ErrorCode::OrderAlreadyCompleted),
            4005 => Ok(ErrorCode::OrderAlreadyCancelled),
            4006 => Ok(ErrorCode::OrderHasUnservedItems),
            4007 => Ok(ErrorCode::OrderTypeMismatch),
            4008 => Ok(ErrorCode::InvalidQuantity),

            // Payment
            5001 => Ok(ErrorCode::PaymentNotFound),
            5002 => Ok(ErrorCode::PaymentAmountMismatch),
            5003 => Ok(ErrorCode::PaymentNotPending),
            5004 => Ok(ErrorCode::PaymentNotPaid),
            5005 => Ok(ErrorCode::RefundReasonRequired),
            5006 => Ok(ErrorCode::TransactionIdInvalid),
            5007 => Ok(ErrorCode::TransactionIdUnmatched),
            5008 => Ok(ErrorCode::TransferAmountMismatch),
            5009 => Ok(ErrorCode::PaymentMethodMismatch),
            5010 => Ok(ErrorCode::PaymentTargetRequired),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemUnavailable),
            6003 => Ok(ErrorCode::MenuItemInvalidPrice),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasItems),
            6103 => Ok(ErrorCode::CategoryNameExists),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableOccupied),
            7003 => Ok(ErrorCode::TableNameExists),
            7004 => Ok(ErrorCode::TableInactive),
            7005 => Ok(ErrorCode::TableHasOpenSession),
            7101 => Ok(ErrorCode::ReservationNotFound),
            7102 => Ok(ErrorCode::ReservationConflict),
            7103 => Ok(ErrorCode::PartySizeExceedsCapacity),

            // User
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UsernameExists),
            8003 => Ok(ErrorCode::UserCannotDeleteSelf),
            8004 => Ok(ErrorCode::UserIsSystem),
            8101 => Ok(ErrorCode::RoleNotFound),
            8102 => Ok(ErrorCode::RoleNameExists),
            8103 => Ok(ErrorCode::RoleInUse),
            8104 => Ok(ErrorCode::RoleIsSystem),
            8201 => Ok(ErrorCode::CustomerNotFound),
            8202 => Ok(ErrorCode::CustomerPhoneExists),
            8301 => Ok(ErrorCode::NotificationNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::InvalidStatusTransition.code(), 9);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::SessionNotFound.code(), 3001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::PaymentNotFound.code(), 5001);
        assert_eq!(ErrorCode::MenuItemNotFound.code(), 6001);
        assert_eq!(ErrorCode::TableNotFound.code(), 7001);
        assert_eq!(ErrorCode::UserNotFound.code(), 8001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(3003), Ok(ErrorCode::SessionAlreadyClosed));
        assert_eq!(ErrorCode::try_from(4006), Ok(ErrorCode::OrderHasUnservedItems));
        assert_eq!(ErrorCode::try_from(5004), Ok(ErrorCode::PaymentNotPaid));
        assert_eq!(ErrorCode::try_from(9005), Ok(ErrorCode::ConfigError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
        assert_eq!(ErrorCode::try_from(1006), Err(InvalidErrorCode(1006)));
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "3");
        assert_eq!(serde_json::to_string(&ErrorCode::TableOccupied).unwrap(), "7002");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("5002").unwrap();
        assert_eq!(code, ErrorCode::PaymentAmountMismatch);

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_every_code_survives_u16() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::SessionCredentialsInvalid,
            ErrorCode::CannotDeleteAdmin,
            ErrorCode::QrTokenExpired,
            ErrorCode::InvalidQuantity,
            ErrorCode::PaymentTargetRequired,
            ErrorCode::CategoryNameExists,
            ErrorCode::PartySizeExceedsCapacity,
            ErrorCode::NotificationNotFound,
            ErrorCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(ErrorCode::OrderNotFound.message(), "Order not found");
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }
}
