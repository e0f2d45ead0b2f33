//! Menu Model
//!
//! Static menu configuration: ordered categories, each an ordered list of
//! items. An item may carry one option group (e.g. milk choice) whose
//! options add a surcharge to the base price.

use crate::error::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One choice inside an option group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuOption {
    /// Translation key, also the option identity
    pub key: String,
    /// Surcharge added to the item base price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Option group attached to a menu item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionGroup {
    pub title_key: String,
    pub items: Vec<MenuOption>,
    /// Key of the option preselected in the UI
    pub default: String,
}

impl OptionGroup {
    /// Find an option by key
    pub fn find(&self, key: &str) -> Option<&MenuOption> {
        self.items.iter().find(|o| o.key == key)
    }

    /// The default option, if it names one of the items
    pub fn default_option(&self) -> Option<&MenuOption> {
        self.find(&self.default)
    }
}

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    /// Stable identifier, used as cart line prefix
    pub id: String,
    pub name_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_key: Option<String>,
    /// Base price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionGroup>,
}

/// Menu category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuCategory {
    pub key: String,
    pub items: Vec<MenuItem>,
}

/// The whole menu, immutable for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Menu {
    pub categories: Vec<MenuCategory>,
}

impl Menu {
    /// Parse and validate a menu from JSON
    pub fn from_json(json: &str) -> AppResult<Self> {
        let menu: Menu = serde_json::from_str(json).map_err(|e| {
            AppError::with_message(ErrorCode::MenuInvalid, format!("Invalid menu JSON: {}", e))
        })?;
        menu.validate()?;
        Ok(menu)
    }

    /// Check prices are non-negative and item ids unique
    pub fn validate(&self) -> AppResult<()> {
        let mut seen = HashSet::new();
        for item in self.items() {
            if !seen.insert(item.id.as_str()) {
                return Err(AppError::with_message(
                    ErrorCode::MenuInvalid,
                    format!("Duplicate menu item id: {}", item.id),
                ));
            }
            if item.price.is_sign_negative() {
                return Err(AppError::with_message(
                    ErrorCode::MenuInvalid,
                    format!("Menu item {} has a negative price", item.id),
                ));
            }
            if let Some(group) = &item.options
                && let Some(opt) = group.items.iter().find(|o| o.price.is_sign_negative())
            {
                return Err(AppError::with_message(
                    ErrorCode::MenuInvalid,
                    format!("Option {} of {} has a negative surcharge", opt.key, item.id),
                ));
            }
        }
        Ok(())
    }

    /// All items in menu order
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    /// Look up an item by id
    pub fn find_item(&self, id: &str) -> Option<&MenuItem> {
        self.items().find(|i| i.id == id)
    }
}
