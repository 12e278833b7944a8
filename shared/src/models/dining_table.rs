//! Dining Table Model

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Table status, set by staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    OutOfOrder,
}

impl TableStatus {
    pub const ALL: [TableStatus; 4] = [
        Self::Available,
        Self::Occupied,
        Self::Reserved,
        Self::OutOfOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Reserved => "reserved",
            Self::OutOfOrder => "out_of_order",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown table status: {s}"))
    }
}

/// Dining table entity (桌台)
///
/// `status` is the staff-managed field. `has_active_orders` is derived at
/// read time from non-terminal orders carrying this table number; the two
/// are never reconciled automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: i64,
    pub table_number: i32,
    pub capacity: i32,
    pub status: TableStatus,
    /// Stable QR-encodable identifier, see [`table_qr_code`]
    pub qr_code: String,
    pub has_active_orders: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableCreate {
    pub table_number: i32,
    pub capacity: Option<i32>,
    pub status: Option<TableStatus>,
}

/// Update dining table payload
///
/// The table number is immutable so the QR code stays valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableUpdate {
    pub capacity: Option<i32>,
}

/// Set table status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatusUpdate {
    pub status: TableStatus,
}

/// Derive the QR identifier for a table number.
///
/// Deterministic: the same table number always yields the same identifier,
/// `table-{n}-{first 8 hex chars of sha256("cafe-table:{n}")}`.
pub fn table_qr_code(table_number: i32) -> String {
    let digest = Sha256::digest(format!("cafe-table:{table_number}").as_bytes());
    format!("table-{table_number}-{}", &hex::encode(digest)[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_code_is_deterministic() {
        assert_eq!(table_qr_code(5), table_qr_code(5));
        assert_ne!(table_qr_code(5), table_qr_code(6));
        assert!(table_qr_code(12).starts_with("table-12-"));
        assert_eq!(table_qr_code(12).len(), "table-12-".len() + 8);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TableStatus::OutOfOrder).unwrap(),
            "\"out_of_order\""
        );
        assert_eq!(
            "out_of_order".parse::<TableStatus>(),
            Ok(TableStatus::OutOfOrder)
        );
    }
}
