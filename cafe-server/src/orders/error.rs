use crate::db::repository::RepoError;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

/// Order engine errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    NotFound(i64),

    #[error("Cannot move order from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order must contain at least one item")]
    Empty,

    #[error("{field} is required")]
    Missing { field: String },

    #[error("{message}")]
    Invalid { field: String, message: String },

    #[error("{message}")]
    TotalsMismatch { field: String, message: String },

    #[error("Menu item {menu_item_id} {reason}")]
    MenuItemUnavailable {
        field: String,
        menu_item_id: i64,
        reason: &'static str,
    },

    #[error("No free order number after {0} attempts")]
    NumberConflict(u32),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl OrderError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    pub fn mismatch(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TotalsMismatch {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::NotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("orderId", id)
            }
            OrderError::IllegalTransition { from, to } => {
                let allowed: Vec<&str> = OrderStatus::ALL
                    .iter()
                    .filter(|s| from.can_transition_to(**s))
                    .map(|s| s.as_str())
                    .collect();
                AppError::with_message(ErrorCode::OrderIllegalTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
                    .with_detail("allowed", allowed)
            }
            OrderError::Empty => AppError::with_message(ErrorCode::OrderEmpty, message)
                .with_detail("field", "items"),
            OrderError::Missing { field } => AppError::required(field),
            OrderError::Invalid { field, .. } => AppError::invalid_field(field, message),
            OrderError::TotalsMismatch { field, .. } => {
                AppError::with_message(ErrorCode::OrderTotalsMismatch, message)
                    .with_detail("field", field)
            }
            OrderError::MenuItemUnavailable {
                field,
                menu_item_id,
                ..
            } => AppError::with_message(ErrorCode::MenuItemUnavailable, message)
                .with_detail("field", field)
                .with_detail("menuItemId", menu_item_id),
            OrderError::NumberConflict(_) => {
                AppError::with_message(ErrorCode::OrderNumberConflict, message)
            }
            OrderError::Repo(e) => e.into(),
        }
    }
}
