//! Built-in café menu

use shared::error::AppResult;
use shared::models::Menu;

const BUILTIN_MENU_JSON: &str = include_str!("../assets/menu.json");

/// Parse the menu shipped with the kiosk
pub fn builtin_menu() -> AppResult<Menu> {
    Menu::from_json(BUILTIN_MENU_JSON)
}
