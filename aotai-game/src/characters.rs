use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::{CatalogError, CatalogKind};

/// Formula modifiers granted by a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CharacterBuffs {
    #[serde(default)]
    pub max_stamina: Option<f64>,
    #[serde(default)]
    pub stamina_cost_mult: Option<f64>,
    #[serde(default)]
    pub move_speed_mult: Option<f64>,
    #[serde(default)]
    pub hunger_drain_mult: Option<f64>,
    /// One-shot skip to the next waypoint.
    #[serde(default)]
    pub teleport: bool,
}

impl CharacterBuffs {
    #[must_use]
    pub fn stamina_cost_mult(&self) -> f64 {
        self.stamina_cost_mult.unwrap_or(1.0)
    }

    #[must_use]
    pub fn move_speed_mult(&self) -> f64 {
        self.move_speed_mult.unwrap_or(1.0)
    }

    #[must_use]
    pub fn hunger_drain_mult(&self) -> f64 {
        self.hunger_drain_mult.unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub buffs: CharacterBuffs,
}

/// Playable characters keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterRoster {
    characters: BTreeMap<String, Character>,
}

impl CharacterRoster {
    /// Parse the id-keyed character map.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON and [`CatalogError::Invalid`]
    /// for non-positive multipliers.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Character> =
            serde_json::from_str(json).map_err(|source| CatalogError::Parse {
                catalog: CatalogKind::Characters,
                source,
            })?;
        let mut characters = BTreeMap::new();
        for (id, mut character) in raw {
            let buffs = &character.buffs;
            let multipliers = [
                buffs.max_stamina,
                buffs.stamina_cost_mult,
                buffs.move_speed_mult,
                buffs.hunger_drain_mult,
            ];
            if multipliers.iter().flatten().any(|value| *value <= 0.0) {
                return Err(CatalogError::invalid(
                    CatalogKind::Characters,
                    format!("character `{id}` has a non-positive buff"),
                ));
            }
            character.id.clone_from(&id);
            characters.insert(id, character);
        }
        Ok(Self { characters })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Buffs for `id`, or neutral buffs when the character is unknown.
    #[must_use]
    pub fn buffs(&self, id: &str) -> CharacterBuffs {
        self.get(id).map(|c| c.buffs.clone()).unwrap_or_default()
    }
}
