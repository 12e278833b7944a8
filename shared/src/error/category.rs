//! Error categories, one per thousand-range of codes

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Unassigned ranges (3xxx, 5xxx) count as `General`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Order,
    Menu,
    Table,
    User,
    /// Server-side failures; message is hidden from clients
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            1 => Self::Auth,
            2 => Self::Permission,
            4 => Self::Order,
            6 => Self::Menu,
            7 => Self::Table,
            8 => Self::User,
            9.. => Self::System,
            _ => Self::General,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert_eq!(ErrorCategory::from_code(7), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1004), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(4005), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(9003), ErrorCategory::System);
    }

    #[test]
    fn test_every_code_lands_in_its_range() {
        for code in ErrorCode::ALL {
            let expected = match code.code() / 1000 {
                0 => ErrorCategory::General,
                1 => ErrorCategory::Auth,
                2 => ErrorCategory::Permission,
                4 => ErrorCategory::Order,
                6 => ErrorCategory::Menu,
                7 => ErrorCategory::Table,
                8 => ErrorCategory::User,
                _ => ErrorCategory::System,
            };
            assert_eq!(code.category(), expected, "{code}");
        }
    }

    #[test]
    fn test_serialized_name() {
        assert_eq!(serde_json::to_string(&ErrorCategory::Menu).unwrap(), "\"menu\"");
    }
}
