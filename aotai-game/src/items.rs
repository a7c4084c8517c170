//! Item catalog: definitions, closed effect set, and weight accounting.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::constants::MAX_WEIGHT_BASE;
use crate::data::{CatalogError, CatalogKind};

/// Item categories as authored in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Food,
    Drink,
    Consumable,
    Gear,
    Tool,
    Container,
}

/// Closed set of effect keys an item may carry.
///
/// Any other key in the catalog is a load error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Hunger,
    Thirst,
    Stamina,
    Sanity,
    SanityRecovery,
    Heal,
    Temp,
    CapacityBonus,
    TempProtection,
    RainProtection,
    SpoilChance,
    NightTemperatureLoss,
    SanityRecoveryNight,
    CanCamp,
    CanCook,
    Fuel,
    MoveCostSnow,
    Warmth,
    ThirstRecoveryBonus,
    CanStartFire,
    StaminaCostReduction,
    CanMoveNight,
    Power,
    StatusCure,
    LostChanceReduction,
    RepairBonus,
    NeedsCooking,
}

/// Player attribute touched when an item is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTarget {
    Hunger,
    Thirst,
    Stamina,
    Sanity,
    Health,
    BodyTemperature,
}

impl StatTarget {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hunger => "hunger",
            Self::Thirst => "thirst",
            Self::Stamina => "stamina",
            Self::Sanity => "sanity",
            Self::Health => "health",
            Self::BodyTemperature => "body_temperature",
        }
    }
}

impl fmt::Display for StatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EffectKind {
    /// Application table for consumption; passive and gear effects map to `None`.
    #[must_use]
    pub const fn consumable_target(self) -> Option<StatTarget> {
        match self {
            Self::Hunger => Some(StatTarget::Hunger),
            Self::Thirst => Some(StatTarget::Thirst),
            Self::Stamina => Some(StatTarget::Stamina),
            Self::Sanity => Some(StatTarget::Sanity),
            Self::Heal => Some(StatTarget::Health),
            Self::Temp => Some(StatTarget::BodyTemperature),
            _ => None,
        }
    }

    /// Whether eating this uncooked only yields half the value.
    #[must_use]
    pub const fn halved_when_raw(self) -> bool {
        matches!(
            self,
            Self::Hunger | Self::Stamina | Self::Sanity | Self::Heal
        )
    }

    /// Stable key used in catalogs and display tables.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Hunger => "hunger",
            Self::Thirst => "thirst",
            Self::Stamina => "stamina",
            Self::Sanity => "sanity",
            Self::SanityRecovery => "sanity_recovery",
            Self::Heal => "heal",
            Self::Temp => "temp",
            Self::CapacityBonus => "capacity_bonus",
            Self::TempProtection => "temp_protection",
            Self::RainProtection => "rain_protection",
            Self::SpoilChance => "spoil_chance",
            Self::NightTemperatureLoss => "night_temperature_loss",
            Self::SanityRecoveryNight => "sanity_recovery_night",
            Self::CanCamp => "can_camp",
            Self::CanCook => "can_cook",
            Self::Fuel => "fuel",
            Self::MoveCostSnow => "move_cost_snow",
            Self::Warmth => "warmth",
            Self::ThirstRecoveryBonus => "thirst_recovery_bonus",
            Self::CanStartFire => "can_start_fire",
            Self::StaminaCostReduction => "stamina_cost_reduction",
            Self::CanMoveNight => "can_move_night",
            Self::Power => "power",
            Self::StatusCure => "status_cure",
            Self::LostChanceReduction => "lost_chance_reduction",
            Self::RepairBonus => "repair_bonus",
            Self::NeedsCooking => "needs_cooking",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Effect payload: either a magnitude or a capability flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectValue {
    Flag(bool),
    Number(f64),
}

impl EffectValue {
    /// Numeric view; flags read as 1.0 or 0.0.
    #[must_use]
    pub const fn as_number(self) -> f64 {
        match self {
            Self::Number(value) => value,
            Self::Flag(true) => 1.0,
            Self::Flag(false) => 0.0,
        }
    }

    #[must_use]
    pub fn is_set(self) -> bool {
        match self {
            Self::Flag(flag) => flag,
            Self::Number(value) => value != 0.0,
        }
    }
}

/// Static definition of a purchasable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub weight: f64,
    pub price: i64,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub effects: BTreeMap<EffectKind, EffectValue>,
}

impl ItemDef {
    #[must_use]
    pub fn effect(&self, kind: EffectKind) -> Option<f64> {
        self.effects.get(&kind).map(|value| value.as_number())
    }

    #[must_use]
    pub fn has_flag(&self, kind: EffectKind) -> bool {
        self.effects.get(&kind).is_some_and(|value| value.is_set())
    }

    /// True when at least one effect changes a stat on consumption.
    #[must_use]
    pub fn is_consumable(&self) -> bool {
        self.effects
            .keys()
            .any(|kind| kind.consumable_target().is_some())
    }

    /// Stat deltas applied when this item is eaten or used.
    #[must_use]
    pub fn consumption_deltas(&self, cooked: bool) -> Vec<(StatTarget, f64)> {
        self.effects
            .iter()
            .filter_map(|(kind, value)| {
                let target = kind.consumable_target()?;
                let mut amount = value.as_number();
                if !cooked && kind.halved_when_raw() {
                    amount *= crate::constants::RAW_FOOD_RATIO;
                }
                Some((target, amount))
            })
            .collect()
    }
}

/// Read-only catalog of every item keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCatalog {
    items: Vec<ItemDef>,
    index: HashMap<String, usize>,
}

impl ItemCatalog {
    /// Parse and validate the catalog from its JSON array document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON or unknown effect keys and
    /// [`CatalogError::Invalid`] for duplicate ids or negative weights and prices.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<ItemDef> = serde_json::from_str(json).map_err(|source| {
            CatalogError::Parse {
                catalog: CatalogKind::Items,
                source,
            }
        })?;
        Self::from_items(items)
    }

    /// Build a catalog from already-parsed definitions.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] for duplicate ids or negative weights and prices.
    pub fn from_items(items: Vec<ItemDef>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if item.weight < 0.0 || item.price < 0 {
                return Err(CatalogError::invalid(
                    CatalogKind::Items,
                    format!("item `{}` has a negative weight or price", item.id),
                ));
            }
            if index.insert(item.id.clone(), position).is_some() {
                return Err(CatalogError::invalid(
                    CatalogKind::Items,
                    format!("duplicate item id `{}`", item.id),
                ));
            }
        }
        Ok(Self { items, index })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.index.get(id).and_then(|&position| self.items.get(position))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total weight of a ledger; unknown ids weigh nothing.
    #[must_use]
    pub fn weight_of(&self, ledger: &BTreeMap<String, u32>) -> f64 {
        ledger
            .iter()
            .filter_map(|(id, &count)| self.get(id).map(|item| item.weight * f64::from(count)))
            .sum()
    }

    /// Total price of a ledger; unknown ids cost nothing.
    #[must_use]
    pub fn cost_of(&self, ledger: &BTreeMap<String, u32>) -> i64 {
        ledger
            .iter()
            .filter_map(|(id, &count)| self.get(id).map(|item| item.price * i64::from(count)))
            .sum()
    }

    /// Carrying capacity: base plus the single best `capacity_bonus` among `ids`.
    #[must_use]
    pub fn capacity_with<'a, I>(&self, ids: I) -> f64
    where
        I: IntoIterator<Item = &'a String>,
    {
        let best_bonus = ids
            .into_iter()
            .filter_map(|id| self.get(id))
            .filter_map(|item| item.effect(EffectKind::CapacityBonus))
            .fold(0.0_f64, f64::max);
        MAX_WEIGHT_BASE + best_bonus
    }

    /// Sum of `temp_protection` across owned items, ignoring counts.
    #[must_use]
    pub fn total_protection(&self, ledger: &BTreeMap<String, u32>) -> f64 {
        ledger
            .keys()
            .filter_map(|id| self.get(id))
            .filter_map(|item| item.effect(EffectKind::TempProtection))
            .sum()
    }

    /// Whether any owned item provides the capability flag.
    #[must_use]
    pub fn any_with_flag(&self, ledger: &BTreeMap<String, u32>, kind: EffectKind) -> bool {
        ledger
            .keys()
            .filter_map(|id| self.get(id))
            .any(|item| item.has_flag(kind))
    }
}
