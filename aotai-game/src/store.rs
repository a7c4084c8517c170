//! Outfitter: cart mutation, checkout, and the remembered cart template.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Rejection;
use crate::items::ItemCatalog;
use crate::state::GameState;

/// Pending purchases, item id to count. Also the saved template document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<String, u32>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self, id: &str) -> u32 {
        self.lines.get(id).copied().unwrap_or(0)
    }

    pub fn set(&mut self, id: &str, count: u32) {
        if count == 0 {
            self.lines.remove(id);
        } else {
            self.lines.insert(id.to_string(), count);
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub const fn lines(&self) -> &BTreeMap<String, u32> {
        &self.lines
    }

    #[must_use]
    pub fn total_cost(&self, items: &ItemCatalog) -> i64 {
        items.cost_of(&self.lines)
    }

    #[must_use]
    pub fn total_weight(&self, items: &ItemCatalog) -> f64 {
        items.weight_of(&self.lines)
    }
}

impl FromIterator<(String, u32)> for Cart {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        let mut cart = Self::new();
        for (id, count) in iter {
            cart.set(&id, count);
        }
        cart
    }
}

/// Result of an accepted cart adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartChange {
    pub item_id: String,
    pub count: u32,
    /// Units asked for beyond what the budget allowed.
    pub shortfall: u32,
}

impl CartChange {
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.shortfall > 0
    }
}

/// Load and capacity if `cart` were bought on top of the current inventory.
#[must_use]
pub fn projected_load(state: &GameState, cart: &Cart, items: &ItemCatalog) -> (f64, f64) {
    let weight = items.weight_of(&state.inventory) + cart.total_weight(items);
    let capacity = items.capacity_with(state.inventory.keys().chain(cart.lines.keys()));
    (weight, capacity)
}

/// Change the cart count of `item_id` by `delta × multiplier`.
///
/// Increases are first trimmed to what the remaining budget covers, then checked
/// against carrying capacity as a whole.
///
/// # Errors
///
/// [`Rejection::UnknownItem`] for ids missing from the catalog,
/// [`Rejection::InsufficientFunds`] when not even one unit is affordable, and
/// [`Rejection::OverCapacity`] when the resulting load is too heavy.
pub fn update_cart(
    state: &GameState,
    cart: &mut Cart,
    items: &ItemCatalog,
    item_id: &str,
    delta: i32,
    multiplier: u32,
) -> Result<CartChange, Rejection> {
    let item = items
        .get(item_id)
        .ok_or_else(|| Rejection::UnknownItem(item_id.to_string()))?;
    let current = i64::from(cart.count(item_id));
    let change = i64::from(delta) * i64::from(multiplier.max(1));
    let target = (current + change).max(0);

    if target <= current {
        let count = u32::try_from(target).unwrap_or(0);
        let mut prospective = cart.clone();
        prospective.set(item_id, count);
        // Dropping a container lowers capacity; refuse if that leaves the pack heavier than it holds.
        let (weight, capacity) = projected_load(state, &prospective, items);
        let (old_weight, old_capacity) = projected_load(state, cart, items);
        if weight > capacity && weight - capacity > old_weight - old_capacity {
            return Err(Rejection::OverCapacity { weight, capacity });
        }
        *cart = prospective;
        return Ok(CartChange {
            item_id: item_id.to_string(),
            count,
            shortfall: 0,
        });
    }

    let requested = target - current;
    let mut granted = requested;
    if item.price > 0 {
        let budget = state.money - cart.total_cost(items);
        let affordable = (budget / item.price).max(0);
        if affordable == 0 {
            return Err(Rejection::InsufficientFunds {
                cost: item.price,
                money: budget.max(0),
            });
        }
        granted = granted.min(affordable);
    }

    let count = u32::try_from(current + granted).unwrap_or(u32::MAX);
    let mut prospective = cart.clone();
    prospective.set(item_id, count);
    let (weight, capacity) = projected_load(state, &prospective, items);
    if weight > capacity {
        return Err(Rejection::OverCapacity { weight, capacity });
    }

    *cart = prospective;
    Ok(CartChange {
        item_id: item_id.to_string(),
        count,
        shortfall: u32::try_from(requested - granted).unwrap_or(u32::MAX),
    })
}

/// Pay for the cart and move it into the inventory. The cart is emptied.
///
/// Returns the purchased lines, suitable for saving as the next template.
///
/// # Errors
///
/// [`Rejection::InsufficientFunds`] when the cart costs more than the money held,
/// [`Rejection::OverCapacity`] when the purchase would not fit in the pack.
pub fn checkout(
    state: &mut GameState,
    cart: &mut Cart,
    items: &ItemCatalog,
) -> Result<Cart, Rejection> {
    let cost = cart.total_cost(items);
    if cost > state.money {
        return Err(Rejection::InsufficientFunds {
            cost,
            money: state.money,
        });
    }
    let (weight, capacity) = projected_load(state, cart, items);
    if weight > capacity {
        return Err(Rejection::OverCapacity { weight, capacity });
    }
    state.money -= cost;
    let purchased = std::mem::take(cart);
    for (id, &count) in purchased.lines() {
        if items.contains(id) {
            state.add_item(id, count);
        }
    }
    state.clamp();
    Ok(purchased)
}

/// Rebuild a saved template against the current catalog, budget, and capacity.
///
/// Unknown ids and lines that would overrun money or capacity are dropped whole,
/// in template order.
#[must_use]
pub fn validate_template(template: &Cart, state: &GameState, items: &ItemCatalog) -> Cart {
    let mut accepted = Cart::new();
    for (id, &count) in template.lines() {
        if count == 0 || !items.contains(id) {
            continue;
        }
        let mut candidate = accepted.clone();
        candidate.set(id, count);
        let (weight, capacity) = projected_load(state, &candidate, items);
        if candidate.total_cost(items) > state.money || weight > capacity {
            log::debug!("cart template drops {count} x {id}");
            continue;
        }
        accepted = candidate;
    }
    accepted
}

#[cfg(test)]
mod tests {
    #![allow(clippy::field_reassign_with_default)]
    use super::*;

    fn catalog() -> ItemCatalog {
        ItemCatalog::from_json(
            r#"[
            {"id": "water_bottle", "name": "Water", "weight": 1.0, "price": 10, "type": "drink",
             "effects": {"thirst": 30}},
            {"id": "stove", "name": "Stove", "weight": 0.5, "price": 120, "type": "tool",
             "effects": {"can_cook": true}},
            {"id": "pack_60l", "name": "60L Pack", "weight": 2.0, "price": 300, "type": "container",
             "effects": {"capacity_bonus": 15}},
            {"id": "anvil", "name": "Anvil", "weight": 19.0, "price": 1, "type": "gear"}
        ]"#,
        )
        .unwrap()
    }

    #[test]
    fn budget_trims_increase_and_reports_shortfall() {
        let items = catalog();
        let mut state = GameState::default();
        state.money = 35;
        let mut cart = Cart::new();
        let change = update_cart(&state, &mut cart, &items, "water_bottle", 1, 10).unwrap();
        assert_eq!(change.count, 3);
        assert_eq!(change.shortfall, 7);
        assert!(change.is_partial());
        assert!(matches!(
            update_cart(&state, &mut cart, &items, "water_bottle", 1, 1),
            Err(Rejection::InsufficientFunds { .. })
        ));
        assert_eq!(cart.count("water_bottle"), 3);
    }

    #[test]
    fn capacity_rejects_whole_increase() {
        let items = catalog();
        let state = GameState::default();
        let mut cart = Cart::new();
        update_cart(&state, &mut cart, &items, "anvil", 1, 1).unwrap();
        let err = update_cart(&state, &mut cart, &items, "water_bottle", 2, 1).unwrap_err();
        assert!(matches!(err, Rejection::OverCapacity { .. }));
        assert_eq!(cart.count("water_bottle"), 0);

        // a pack in the cart raises capacity for everything else
        update_cart(&state, &mut cart, &items, "pack_60l", 1, 1).unwrap();
        update_cart(&state, &mut cart, &items, "water_bottle", 2, 1).unwrap();
        assert_eq!(cart.count("water_bottle"), 2);
    }

    #[test]
    fn decreases_clamp_at_zero() {
        let items = catalog();
        let state = GameState::default();
        let mut cart = Cart::new();
        update_cart(&state, &mut cart, &items, "water_bottle", 2, 1).unwrap();
        let change = update_cart(&state, &mut cart, &items, "water_bottle", -1, 10).unwrap();
        assert_eq!(change.count, 0);
        assert!(cart.is_empty());
        assert!(matches!(
            update_cart(&state, &mut cart, &items, "nope", 1, 1),
            Err(Rejection::UnknownItem(_))
        ));
    }

    #[test]
    fn removing_a_pack_cannot_strand_its_load() {
        let items = catalog();
        let state = GameState::default();
        let mut cart = Cart::new();
        update_cart(&state, &mut cart, &items, "pack_60l", 1, 1).unwrap();
        while update_cart(&state, &mut cart, &items, "water_bottle", 1, 1).is_ok() {}
        let bottles = cart.count("water_bottle");
        assert!(bottles > 20);

        let err = update_cart(&state, &mut cart, &items, "pack_60l", -1, 1).unwrap_err();
        assert!(matches!(err, Rejection::OverCapacity { .. }));
        assert_eq!(cart.count("pack_60l"), 1);
        let (weight, capacity) = projected_load(&state, &cart, &items);
        assert!(weight <= capacity);

        // shedding bottles first makes the pack removable again
        update_cart(&state, &mut cart, &items, "water_bottle", -1, bottles).unwrap();
        update_cart(&state, &mut cart, &items, "pack_60l", -1, 1).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn checkout_refuses_an_overweight_cart() {
        let items = catalog();
        let mut state = GameState::default();
        let mut cart: Cart = [("anvil".to_string(), 2)].into_iter().collect();
        let before = state.clone();
        assert!(matches!(
            checkout(&mut state, &mut cart, &items),
            Err(Rejection::OverCapacity { .. })
        ));
        assert_eq!(state, before);
        assert_eq!(cart.count("anvil"), 2);
    }

    #[test]
    fn checkout_over_budget_changes_nothing() {
        let items = catalog();
        let mut state = GameState::default();
        state.money = 100;
        let mut cart: Cart = [("stove".to_string(), 1)].into_iter().collect();
        let before = state.clone();
        assert!(matches!(
            checkout(&mut state, &mut cart, &items),
            Err(Rejection::InsufficientFunds { cost: 120, money: 100 })
        ));
        assert_eq!(state, before);
        assert_eq!(cart.count("stove"), 1);
    }

    #[test]
    fn checkout_debits_and_merges() {
        let items = catalog();
        let mut state = GameState::default();
        state.add_item("water_bottle", 1);
        let mut cart: Cart = [("water_bottle".to_string(), 2), ("stove".to_string(), 1)]
            .into_iter()
            .collect();
        let bought = checkout(&mut state, &mut cart, &items).unwrap();
        assert_eq!(state.money, 2_000 - 140);
        assert_eq!(state.item_count("water_bottle"), 3);
        assert!(cart.is_empty());
        assert_eq!(bought.count("stove"), 1);
    }

    #[test]
    fn template_drops_unknown_and_unaffordable_lines() {
        let items = catalog();
        let mut state = GameState::default();
        state.money = 150;
        let template: Cart = [
            ("ghost".to_string(), 1),
            ("pack_60l".to_string(), 1),
            ("stove".to_string(), 1),
            ("water_bottle".to_string(), 2),
        ]
        .into_iter()
        .collect();
        let valid = validate_template(&template, &state, &items);
        assert_eq!(valid.count("ghost"), 0);
        assert_eq!(valid.count("pack_60l"), 0);
        assert_eq!(valid.count("stove"), 1);
        assert_eq!(valid.count("water_bottle"), 2);
    }
}
