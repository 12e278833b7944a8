//! Text limits for free-form input
//!
//! SQLite TEXT columns accept any length, so limits live here. Lengths are
//! counted in characters.

use crate::utils::{AppError, AppResult};

/// Menu item names, usernames
pub const MAX_NAME_LEN: usize = 200;
/// Order notes, menu descriptions
pub const MAX_NOTE_LEN: usize = 500;
pub const MAX_URL_LEN: usize = 2048;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Non-blank and at most `max` characters
pub fn require_text(value: &str, field: &str, max: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_field(field, format!("{field} must not be blank")));
    }
    limit_text(Some(value), field, max)
}

/// At most `max` characters when present
pub fn limit_text(value: Option<&str>, field: &str, max: usize) -> AppResult<()> {
    match value.map(|v| v.chars().count()) {
        Some(len) if len > max => Err(AppError::invalid_field(
            field,
            format!("{field} has {len} characters, the limit is {max}"),
        )),
        _ => Ok(()),
    }
}

pub fn check_password(password: &str, field: &str) -> AppResult<()> {
    let len = password.chars().count();
    if (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        Ok(())
    } else {
        Err(AppError::invalid_field(
            field,
            format!("{field} must be {MIN_PASSWORD_LEN} to {MAX_PASSWORD_LEN} characters"),
        ))
    }
}
