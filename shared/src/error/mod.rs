//! Error codes, categories and the `AppError` response type
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::OrderIllegalTransition, "pending -> ready")
//!     .with_detail("from", "pending")
//!     .with_detail("to", "ready");
//!
//! assert_eq!(ApiResponse::from(&err).code, 4003);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
