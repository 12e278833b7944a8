//! Data models
//!
//! Shared between the server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY). Models carrying money
//! are hydrated by the server from integer-cent columns.

pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod stats;
pub mod user;

// Re-exports
pub use dining_table::*;
pub use menu_item::*;
pub use order::*;
pub use stats::*;
pub use user::*;
