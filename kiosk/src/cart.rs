//! Cart Engine
//!
//! Lines are keyed by `itemId` or `itemId-optionKey`. The unit price is
//! fixed when a line is first created; totals are always folded from the
//! lines, never cached.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::models::{MenuItem, MenuOption, OrderLine};
use shared::money;

/// Cart value at which the cart button is drawn full
pub const CART_VALUE_TARGET: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// One priced, quantified cart entry
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: String,
    pub item_id: String,
    pub name_key: String,
    /// Chosen option key, also when it did not match any option
    pub option_key: Option<String>,
    /// Base price plus option surcharge at first add
    pub unit_price: Decimal,
    /// Always ≥ 1 while the line exists
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        money::line_total(self.unit_price, self.quantity)
    }

    /// Name sent with the order line
    pub fn display_name(&self) -> String {
        match &self.option_key {
            Some(option) => format!("{} ({})", self.name_key, option),
            None => self.name_key.clone(),
        }
    }

    pub fn to_order_line(&self) -> OrderLine {
        OrderLine {
            id: self.id.clone(),
            quantity: self.quantity,
            name: self.display_name(),
            price: self.unit_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    pub total_price: Decimal,
    pub total_items: u32,
}

impl CartTotals {
    /// `total_price / target`, clamped to `[0, 1]`
    pub fn fill_ratio(&self, target: Decimal) -> Decimal {
        if target <= Decimal::ZERO {
            return Decimal::ONE;
        }
        (self.total_price / target).min(Decimal::ONE)
    }
}

/// How a selected option key resolved against an item's option group
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionResolution<'a> {
    NoneSelected,
    Found(&'a MenuOption),
    /// Selected but not offered by the item: zero surcharge
    NotFound(&'a str),
}

impl<'a> OptionResolution<'a> {
    pub fn resolve(item: &'a MenuItem, selected: Option<&'a str>) -> Self {
        let Some(key) = selected.filter(|k| !k.is_empty()) else {
            return OptionResolution::NoneSelected;
        };
        match item.options.as_ref().and_then(|group| group.find(key)) {
            Some(option) => OptionResolution::Found(option),
            None => OptionResolution::NotFound(key),
        }
    }

    pub fn surcharge(&self) -> Decimal {
        match self {
            OptionResolution::Found(option) => option.price,
            OptionResolution::NoneSelected | OptionResolution::NotFound(_) => Decimal::ZERO,
        }
    }

    pub fn key(&self) -> Option<&'a str> {
        match *self {
            OptionResolution::NoneSelected => None,
            OptionResolution::Found(option) => Some(option.key.as_str()),
            OptionResolution::NotFound(key) => Some(key),
        }
    }
}

/// `itemId` or `itemId-optionKey`
pub fn line_id(item_id: &str, option_key: Option<&str>) -> String {
    match option_key {
        Some(option) => format!("{}-{}", item_id, option),
        None => item_id.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: BTreeMap<String, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `item` with the selected option
    ///
    /// An existing line keeps its unit price and gains one unit.
    pub fn add_item(&mut self, item: &MenuItem, selected_option: Option<&str>) -> &CartLine {
        let resolution = OptionResolution::resolve(item, selected_option);
        if let OptionResolution::NotFound(key) = resolution {
            tracing::debug!(item_id = %item.id, option = %key, "Unknown option, no surcharge");
        }
        let id = line_id(&item.id, resolution.key());

        let line = self
            .lines
            .entry(id.clone())
            .and_modify(|line| line.quantity = line.quantity.saturating_add(1))
            .or_insert_with(|| CartLine {
                id,
                item_id: item.id.clone(),
                name_key: item.name_key.clone(),
                option_key: resolution.key().map(str::to_string),
                unit_price: item.price + resolution.surcharge(),
                quantity: 1,
            });
        line
    }

    /// Apply `delta` to a line; lines reaching zero or below are removed
    ///
    /// Unknown ids are ignored.
    pub fn change_quantity(&mut self, line_id: &str, delta: i64) {
        let Some(line) = self.lines.get_mut(line_id) else {
            return;
        };
        let next = i64::from(line.quantity).saturating_add(delta);
        if next <= 0 {
            self.lines.remove(line_id);
        } else {
            line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total_price: money::sum_lines(self.lines.values().map(|l| (l.unit_price, l.quantity))),
            total_items: self
                .lines
                .values()
                .fold(0u32, |acc, l| acc.saturating_add(l.quantity)),
        }
    }

    pub fn get(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.get(line_id)
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Order payload lines, one per cart line
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.lines.values().map(CartLine::to_order_line).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OptionGroup;

    fn espresso() -> MenuItem {
        MenuItem {
            id: "espresso".into(),
            name_key: "item_espresso".into(),
            description_key: None,
            price: Decimal::from(8),
            options: None,
        }
    }

    fn cappuccino() -> MenuItem {
        MenuItem {
            id: "cappuccino".into(),
            name_key: "item_cappuccino".into(),
            description_key: Some("desc_300ml".into()),
            price: Decimal::from(15),
            options: Some(OptionGroup {
                title_key: "opt_title_milk".into(),
                default: "opt_item_whole_milk".into(),
                items: vec![
                    MenuOption { key: "opt_item_whole_milk".into(), price: Decimal::ZERO },
                    MenuOption { key: "opt_item_vegan_milk".into(), price: Decimal::from(3) },
                ],
            }),
        }
    }

    #[test]
    fn test_add_twice_increments() {
        let mut cart = Cart::new();
        cart.add_item(&espresso(), None);
        let line = cart.add_item(&espresso(), None);
        assert_eq!(line.id, "espresso");
        assert_eq!(line.quantity, 2);
        assert_eq!(cart.totals().total_price, Decimal::from(16));
        assert_eq!(cart.totals().total_items, 2);
    }

    #[test]
    fn test_option_composite_id_and_surcharge() {
        let mut cart = Cart::new();
        let line = cart.add_item(&cappuccino(), Some("opt_item_vegan_milk")).clone();
        assert_eq!(line.id, "cappuccino-opt_item_vegan_milk");
        assert_eq!(line.unit_price, Decimal::from(18));

        cart.add_item(&cappuccino(), Some("opt_item_whole_milk"));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.totals().total_price, Decimal::from(33));
    }

    #[test]
    fn test_unknown_option_zero_surcharge() {
        let mut cart = Cart::new();
        let line = cart.add_item(&cappuccino(), Some("opt_item_oat_milk"));
        assert_eq!(line.id, "cappuccino-opt_item_oat_milk");
        assert_eq!(line.unit_price, Decimal::from(15));
        assert_eq!(line.option_key.as_deref(), Some("opt_item_oat_milk"));
    }

    #[test]
    fn test_empty_option_is_none_selected() {
        let mut cart = Cart::new();
        let line = cart.add_item(&cappuccino(), Some(""));
        assert_eq!(line.id, "cappuccino");
        assert!(line.option_key.is_none());
    }

    #[test]
    fn test_price_fixed_at_first_add() {
        let mut cart = Cart::new();
        cart.add_item(&espresso(), None);

        let mut repriced = espresso();
        repriced.price = Decimal::from(10);
        let line = cart.add_item(&repriced, None);
        assert_eq!(line.unit_price, Decimal::from(8));
        assert_eq!(cart.totals().total_price, Decimal::from(16));
    }

    #[test]
    fn test_change_quantity() {
        let mut cart = Cart::new();
        cart.add_item(&espresso(), None);

        cart.change_quantity("espresso", 2);
        assert_eq!(cart.get("espresso").unwrap().quantity, 3);

        cart.change_quantity("espresso", -1);
        assert_eq!(cart.get("espresso").unwrap().quantity, 2);

        cart.change_quantity("espresso", -2);
        assert!(cart.get("espresso").is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_extreme_deltas() {
        let mut cart = Cart::new();
        cart.add_item(&espresso(), None);

        cart.change_quantity("espresso", i64::MAX);
        assert_eq!(cart.get("espresso").unwrap().quantity, u32::MAX);

        cart.change_quantity("espresso", i64::MAX);
        assert_eq!(cart.get("espresso").unwrap().quantity, u32::MAX);

        cart.change_quantity("espresso", i64::MIN);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_unknown_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&espresso(), None);
        let before = cart.clone();
        cart.change_quantity("mocha", 5);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_order_lines() {
        let mut cart = Cart::new();
        cart.add_item(&espresso(), None);
        cart.add_item(&espresso(), None);
        let lines = cart.order_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, "espresso");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].price, Decimal::from(8));
    }

    #[test]
    fn test_fill_ratio() {
        let mut cart = Cart::new();
        assert_eq!(cart.totals().fill_ratio(CART_VALUE_TARGET), Decimal::ZERO);

        for _ in 0..4 {
            cart.add_item(&espresso(), None);
        }
        assert_eq!(
            cart.totals().fill_ratio(CART_VALUE_TARGET),
            Decimal::new(64, 2)
        );

        for _ in 0..10 {
            cart.add_item(&espresso(), None);
        }
        assert_eq!(cart.totals().fill_ratio(CART_VALUE_TARGET), Decimal::ONE);
    }
}
