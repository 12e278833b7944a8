//! Numeric error codes
//!
//! Codes are grouped by thousands so a client can branch on the range
//! without knowing every variant:
//! - 0xxx: general
//! - 1xxx: authentication
//! - 2xxx: authorization
//! - 4xxx: orders
//! - 6xxx: menu
//! - 7xxx: tables
//! - 8xxx: users
//! - 9xxx: system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code carried in every error response (`{"code": 4003, ...}`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // 0xxx
    Success = 0,
    Unknown = 1,
    ValidationFailed = 2,
    NotFound = 3,
    AlreadyExists = 4,
    InvalidRequest = 5,
    InvalidFormat = 6,
    RequiredField = 7,
    ValueOutOfRange = 8,

    // 1xxx
    NotAuthenticated = 1001,
    InvalidCredentials = 1002,
    TokenExpired = 1003,
    TokenInvalid = 1004,
    AccountDisabled = 1007,

    // 2xxx
    PermissionDenied = 2001,
    /// The session's role is not in the route's allowed set
    RoleRequired = 2002,
    AdminRequired = 2003,

    // 4xxx
    OrderNotFound = 4001,
    /// Cart without line items
    OrderEmpty = 4002,
    /// Details carry `from`, `to` and `allowed`
    OrderIllegalTransition = 4003,
    /// A submitted amount disagrees with the recomputed one
    OrderTotalsMismatch = 4004,
    /// Every retry hit an existing order number
    OrderNumberConflict = 4005,
    OrderItemNotFound = 4006,

    // 6xxx
    MenuItemNotFound = 6001,
    /// Missing or deactivated item in a cart
    MenuItemUnavailable = 6002,
    /// Delete refused while order lines reference the item
    MenuItemInUse = 6003,
    MenuItemInvalidPrice = 6004,

    // 7xxx
    TableNotFound = 7001,
    TableNumberExists = 7002,

    // 8xxx
    UserNotFound = 8001,
    UsernameExists = 8002,

    // 9xxx
    InternalError = 9001,
    DatabaseError = 9002,
    /// Pool closed, timed out or the database file is unreachable
    StoreUnavailable = 9003,
    ConfigError = 9005,
}

impl ErrorCode {
    /// Every defined code, in numeric order
    pub const ALL: [ErrorCode; 35] = [
        Self::Success,
        Self::Unknown,
        Self::ValidationFailed,
        Self::NotFound,
        Self::AlreadyExists,
        Self::InvalidRequest,
        Self::InvalidFormat,
        Self::RequiredField,
        Self::ValueOutOfRange,
        Self::NotAuthenticated,
        Self::InvalidCredentials,
        Self::TokenExpired,
        Self::TokenInvalid,
        Self::AccountDisabled,
        Self::PermissionDenied,
        Self::RoleRequired,
        Self::AdminRequired,
        Self::OrderNotFound,
        Self::OrderEmpty,
        Self::OrderIllegalTransition,
        Self::OrderTotalsMismatch,
        Self::OrderNumberConflict,
        Self::OrderItemNotFound,
        Self::MenuItemNotFound,
        Self::MenuItemUnavailable,
        Self::MenuItemInUse,
        Self::MenuItemInvalidPrice,
        Self::TableNotFound,
        Self::TableNumberExists,
        Self::UserNotFound,
        Self::UsernameExists,
        Self::InternalError,
        Self::DatabaseError,
        Self::StoreUnavailable,
        Self::ConfigError,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Default English message, used when no specific one is given
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown => "Something went wrong",
            Self::ValidationFailed => "Request failed validation",
            Self::NotFound => "Not found",
            Self::AlreadyExists => "Already exists",
            Self::InvalidRequest => "Malformed request",
            Self::InvalidFormat => "Value has the wrong format",
            Self::RequiredField => "A required field is missing",
            Self::ValueOutOfRange => "Value is outside the allowed range",

            Self::NotAuthenticated => "Sign-in required",
            Self::InvalidCredentials => "Invalid username or password",
            Self::TokenExpired => "Session expired, sign in again",
            Self::TokenInvalid => "Session token is not valid",
            Self::AccountDisabled => "This account is disabled",

            Self::PermissionDenied => "Not allowed",
            Self::RoleRequired => "Your role cannot do this",
            Self::AdminRequired => "Admins only",

            Self::OrderNotFound => "Order not found",
            Self::OrderEmpty => "An order needs at least one item",
            Self::OrderIllegalTransition => "Order cannot move to that status",
            Self::OrderTotalsMismatch => "Order amounts do not add up",
            Self::OrderNumberConflict => "No free order number, try again",
            Self::OrderItemNotFound => "Order line not found",

            Self::MenuItemNotFound => "Menu item not found",
            Self::MenuItemUnavailable => "Menu item cannot be ordered",
            Self::MenuItemInUse => "Menu item is referenced by orders, deactivate it instead",
            Self::MenuItemInvalidPrice => "Menu item price is invalid",

            Self::TableNotFound => "Table not found",
            Self::TableNumberExists => "Table number is taken",

            Self::UserNotFound => "User not found",
            Self::UsernameExists => "Username is taken",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::StoreUnavailable => "Storage is unavailable, retry shortly",
            Self::ConfigError => "Server is misconfigured",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A `u16` that is not a defined [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error code {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
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
    fn test_wire_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::RoleRequired.code(), 2002);
        assert_eq!(ErrorCode::OrderIllegalTransition.code(), 4003);
        assert_eq!(ErrorCode::MenuItemInUse.code(), 6003);
        assert_eq!(ErrorCode::TableNumberExists.code(), 7002);
        assert_eq!(ErrorCode::StoreUnavailable.code(), 9003);
    }

    #[test]
    fn test_all_is_sorted_and_round_trips() {
        for pair in ErrorCode::ALL.windows(2) {
            assert!(pair[0].code() < pair[1].code());
        }
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert_eq!(ErrorCode::try_from(5001), Err(InvalidErrorCode(5001)));
        assert!(serde_json::from_str::<ErrorCode>("999").is_err());
        assert_eq!(
            serde_json::from_str::<ErrorCode>("4001").unwrap(),
            ErrorCode::OrderNotFound
        );
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::OrderEmpty).unwrap(), "4002");
        assert_eq!(ErrorCode::MenuItemInUse.to_string(), "6003");
    }
}
