//! Shared types for the café ordering server
//!
//! Wire and data contracts used by the server and its clients: models,
//! the order status state machine, real-time event types, and the
//! unified error system.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use message::{CafeEvent, Topic};
