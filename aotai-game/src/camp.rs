//! Overnight spoilage and scavenging rolls.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::constants::{
    KARMA_LUCK_PER_POINT, SCAVENGE_COMMON, SCAVENGE_COMMON_BELOW, SCAVENGE_NOTHING_BELOW,
    SCAVENGE_PRECIOUS, SCAVENGE_RARE, SCAVENGE_RARE_BELOW,
};
use crate::items::{EffectKind, ItemCatalog};
use crate::state::GameState;

/// Roll spoilage for every perishable item; each loses at most one unit.
///
/// Returns the ids that lost a unit, in inventory order.
pub fn spoil_items<R>(state: &mut GameState, items: &ItemCatalog, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let perishable: Vec<(String, f64)> = state
        .inventory
        .keys()
        .filter_map(|id| {
            items
                .get(id)
                .and_then(|item| item.effect(EffectKind::SpoilChance))
                .map(|chance| (id.clone(), chance))
        })
        .collect();
    let mut spoiled = Vec::new();
    for (id, chance) in perishable {
        if rng.r#gen::<f64>() < chance {
            state.remove_item(&id, 1);
            spoiled.push(id);
        }
    }
    spoiled
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindTier {
    Nothing,
    Common,
    Rare,
    Precious,
}

impl FindTier {
    /// Map a luck-adjusted roll onto a tier.
    #[must_use]
    pub fn from_roll(roll: f64) -> Self {
        if roll < SCAVENGE_NOTHING_BELOW {
            Self::Nothing
        } else if roll < SCAVENGE_COMMON_BELOW {
            Self::Common
        } else if roll < SCAVENGE_RARE_BELOW {
            Self::Rare
        } else {
            Self::Precious
        }
    }

    const fn pool(self) -> &'static [&'static str] {
        match self {
            Self::Nothing => &[],
            Self::Common => &SCAVENGE_COMMON,
            Self::Rare => &SCAVENGE_RARE,
            Self::Precious => &SCAVENGE_PRECIOUS,
        }
    }
}

/// Outcome of one scavenging attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScavengeFind {
    pub tier: FindTier,
    pub item_id: Option<String>,
}

/// Search the surroundings. Karma shifts the roll; ids missing from the catalog are skipped.
///
/// The caller pays the action point and hour.
pub fn scavenge<R>(state: &mut GameState, items: &ItemCatalog, rng: &mut R) -> ScavengeFind
where
    R: Rng + ?Sized,
{
    let roll = rng.r#gen::<f64>() + f64::from(state.karma) * KARMA_LUCK_PER_POINT;
    let tier = FindTier::from_roll(roll);
    let available: Vec<&str> = tier
        .pool()
        .iter()
        .copied()
        .filter(|id| items.contains(id))
        .collect();
    let item_id = available.choose(rng).map(|id| (*id).to_string());
    if let Some(id) = &item_id {
        state.add_item(id, 1);
    }
    log::debug!("scavenge roll {roll:.3} -> {tier:?} {item_id:?}");
    ScavengeFind { tier, item_id }
}
