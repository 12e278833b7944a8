//! ErrorCode -> HTTP status

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Anything not listed is a client-side validation problem (400)
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::MenuItemNotFound
            | Self::TableNotFound
            | Self::UserNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists
            | Self::OrderIllegalTransition
            | Self::OrderNumberConflict
            | Self::MenuItemInUse
            | Self::TableNumberExists
            | Self::UsernameExists => StatusCode::CONFLICT,

            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied | Self::RoleRequired | Self::AdminRequired => {
                StatusCode::FORBIDDEN
            }

            // retryable
            Self::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            _ => StatusCode::BAD_REQUEST,
        }
    }
}
