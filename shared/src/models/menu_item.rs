//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Menu category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
pub enum MenuCategory {
    Coffee,
    Food,
    Desserts,
}

impl MenuCategory {
    pub const ALL: [MenuCategory; 3] = [Self::Coffee, Self::Food, Self::Desserts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coffee => "coffee",
            Self::Food => "food",
            Self::Desserts => "desserts",
        }
    }
}

impl fmt::Display for MenuCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown menu category: {s}"))
    }
}

/// Sellable menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Current price, 2 decimal places
    pub price: Decimal,
    pub category: MenuCategory,
    pub is_active: bool,
    /// Image reference (URL or asset path)
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: MenuCategory,
    pub is_active: Option<bool>,
    pub image: Option<String>,
}

/// Update menu item payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<MenuCategory>,
    pub is_active: Option<bool>,
    pub image: Option<String>,
}

/// Menu listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuQuery {
    pub category: Option<MenuCategory>,
    #[serde(default, alias = "active_only")]
    pub active_only: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_through_str() {
        for category in MenuCategory::ALL {
            assert_eq!(category.as_str().parse::<MenuCategory>(), Ok(category));
        }
        assert!("drinks".parse::<MenuCategory>().is_err());
    }

    #[test]
    fn test_menu_item_wire_shape() {
        let item = MenuItem {
            id: 1,
            name: "Flat White".to_string(),
            description: None,
            price: Decimal::new(450, 2),
            category: MenuCategory::Coffee,
            is_active: true,
            image: None,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["price"], "4.50");
        assert_eq!(json["category"], "coffee");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_create_accepts_numeric_and_string_price() {
        let a: MenuItemCreate =
            serde_json::from_str(r#"{"name":"Scone","price":"3.25","category":"food"}"#).unwrap();
        let b: MenuItemCreate =
            serde_json::from_str(r#"{"name":"Scone","price":3.25,"category":"food"}"#).unwrap();
        assert_eq!(a.price, b.price);
        assert_eq!(a.price, Decimal::new(325, 2));
    }
}
