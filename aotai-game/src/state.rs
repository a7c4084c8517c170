//! Persistent world and player record.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::constants::{
    DAILY_ACTION_POINTS, DEFAULT_CHARACTER_ID, HOURS_PER_DAY, HYPOTHERMIA_DEATH_TEMP,
    MAX_BODY_TEMP, MAX_HEALTH, MAX_HUNGER, MAX_SANITY, MAX_STAMINA, MAX_THIRST, MIN_BODY_TEMP,
    START_BODY_TEMP, START_HOUR, START_MONEY, START_NODE_ID,
};
use crate::items::{ItemDef, StatTarget};
use crate::map::MapGraph;
use crate::season::Season;
use crate::weather::WeatherState;

/// Physiological readings of the hiker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub stamina: f64,
    pub hunger: f64,
    pub thirst: f64,
    pub sanity: f64,
    pub health: f64,
    /// Body temperature in degrees Celsius.
    pub temperature: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            stamina: MAX_STAMINA,
            hunger: MAX_HUNGER,
            thirst: MAX_THIRST,
            sanity: MAX_SANITY,
            health: MAX_HEALTH,
            temperature: START_BODY_TEMP,
        }
    }
}

impl Stats {
    /// Clamp every reading; `stamina_cap` is the character-specific stamina ceiling.
    pub fn clamp(&mut self, stamina_cap: f64) {
        self.stamina = self.stamina.clamp(0.0, stamina_cap);
        self.hunger = self.hunger.clamp(0.0, MAX_HUNGER);
        self.thirst = self.thirst.clamp(0.0, MAX_THIRST);
        self.sanity = self.sanity.clamp(0.0, MAX_SANITY);
        self.health = self.health.clamp(0.0, MAX_HEALTH);
        self.temperature = self.temperature.clamp(MIN_BODY_TEMP, MAX_BODY_TEMP);
    }

    pub fn adjust(&mut self, target: StatTarget, delta: f64) {
        match target {
            StatTarget::Hunger => self.hunger += delta,
            StatTarget::Thirst => self.thirst += delta,
            StatTarget::Stamina => self.stamina += delta,
            StatTarget::Sanity => self.sanity += delta,
            StatTarget::Health => self.health += delta,
            StatTarget::BodyTemperature => self.temperature += delta,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    Victory,
    Retreated,
    Death,
    MentalCollapse,
    Hypothermia,
    Starvation,
    Dehydration,
}

impl Ending {
    /// Reaching the end or retreating alive both count as surviving.
    #[must_use]
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Victory | Self::Retreated)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Victory => "victory",
            Self::Retreated => "retreated",
            Self::Death => "death",
            Self::MentalCollapse => "mental_collapse",
            Self::Hypothermia => "hypothermia",
            Self::Starvation => "starvation",
            Self::Dehydration => "dehydration",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Victory => "You completed the Aotai traverse.",
            Self::Retreated => "You retreated safely from the ridge.",
            Self::Death => "Your injuries were too severe. You died on the ridge.",
            Self::MentalCollapse => "Your mind gave way to the mountain.",
            Self::Hypothermia => "Your body temperature fell too low. You died of hypothermia.",
            Self::Starvation => "You starved on the ridge.",
            Self::Dehydration => "You died of dehydration.",
        }
    }
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running records kept for the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub max_altitude: f64,
    pub lowest_temp: f64,
    pub lowest_sanity: f64,
    pub days_survived: u32,
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self {
            max_altitude: 0.0,
            lowest_temp: 100.0,
            lowest_sanity: 100.0,
            days_survived: 0,
        }
    }
}

/// Everything that changes during a session; this is also the save document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub stats: Stats,
    #[serde(default = "default_stamina_cap")]
    pub stamina_cap: f64,
    pub money: i64,
    pub karma: i32,
    pub action_points: i32,
    pub inventory: BTreeMap<String, u32>,
    #[serde(default)]
    pub equipment: BTreeSet<String>,
    pub current_node_id: String,
    #[serde(default)]
    pub distance_traveled: f64,
    pub distance_to_next_node: f64,
    #[serde(default)]
    pub total_distance: f64,
    /// Days elapsed.
    pub game_time: u32,
    /// Hour of day, 0 through 23.
    pub day_time: u32,
    pub weather: WeatherState,
    pub env_temp: f64,
    pub wind_level: u8,
    pub triggered_events: BTreeSet<String>,
    pub character_id: String,
    pub season: Season,
    pub teleport_used: bool,
    #[serde(default)]
    pub statistics: RunStatistics,
    #[serde(default)]
    pub ending: Option<Ending>,
}

const fn default_stamina_cap() -> f64 {
    MAX_STAMINA
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            stats: Stats::default(),
            stamina_cap: MAX_STAMINA,
            money: START_MONEY,
            karma: 0,
            action_points: DAILY_ACTION_POINTS,
            inventory: BTreeMap::new(),
            equipment: BTreeSet::new(),
            current_node_id: START_NODE_ID.to_string(),
            distance_traveled: 0.0,
            distance_to_next_node: 0.0,
            total_distance: 0.0,
            game_time: 0,
            day_time: START_HOUR,
            weather: WeatherState::default(),
            env_temp: 20.0,
            wind_level: 1,
            triggered_events: BTreeSet::new(),
            character_id: DEFAULT_CHARACTER_ID.to_string(),
            season: Season::default(),
            teleport_used: false,
            statistics: RunStatistics::default(),
            ending: None,
        }
    }
}

impl GameState {
    /// Fresh record for a new game.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Full reset, including character and season.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Reset every field except the character and season choices.
    pub fn reset_keep_setup(&mut self) {
        let character_id = std::mem::take(&mut self.character_id);
        let season = self.season;
        *self = Self {
            character_id,
            season,
            ..Self::default()
        };
    }

    /// Apply a character's stamina ceiling and top stamina up to it.
    pub fn apply_stamina_cap(&mut self, cap: f64) {
        self.stamina_cap = cap.clamp(1.0, MAX_STAMINA);
        self.stats.stamina = self.stamina_cap;
    }

    /// Clamp stats and ledgers into their documented ranges.
    pub fn clamp(&mut self) {
        self.stats.clamp(self.stamina_cap);
        self.money = self.money.max(0);
        self.action_points = self.action_points.max(0);
        self.distance_to_next_node = self.distance_to_next_node.max(0.0);
        self.inventory.retain(|_, count| *count > 0);
        let inventory = &self.inventory;
        self.equipment.retain(|id| inventory.contains_key(id));
    }

    /// Update running minimums after a physiology tick.
    pub fn record_lows(&mut self) {
        let stats = &mut self.statistics;
        stats.lowest_temp = stats.lowest_temp.min(self.stats.temperature);
        stats.lowest_sanity = stats.lowest_sanity.min(self.stats.sanity);
    }

    /// Advance the clock; every day rollover refills action points once.
    pub fn update_time(&mut self, hours: u32) {
        self.day_time += hours;
        while self.day_time >= HOURS_PER_DAY {
            self.day_time -= HOURS_PER_DAY;
            self.game_time += 1;
            self.action_points = DAILY_ACTION_POINTS;
            log::debug!("day {} begins", self.game_time);
        }
    }

    /// Night for event purposes: before 06:00 or after 19:00.
    #[must_use]
    pub const fn is_night(&self) -> bool {
        self.day_time < crate::constants::NIGHT_EVENT_BEFORE
            || self.day_time > crate::constants::NIGHT_EVENT_AFTER
    }

    pub fn add_item(&mut self, id: &str, count: u32) {
        if count == 0 {
            return;
        }
        let entry = self.inventory.entry(id.to_string()).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Remove up to `count` units; returns false if the item was not held.
    pub fn remove_item(&mut self, id: &str, count: u32) -> bool {
        let Some(held) = self.inventory.get_mut(id) else {
            return false;
        };
        *held = held.saturating_sub(count);
        if *held == 0 {
            self.inventory.remove(id);
            self.equipment.remove(id);
        }
        true
    }

    #[must_use]
    pub fn has_item(&self, id: &str) -> bool {
        self.inventory.get(id).is_some_and(|count| *count > 0)
    }

    #[must_use]
    pub fn item_count(&self, id: &str) -> u32 {
        self.inventory.get(id).copied().unwrap_or(0)
    }

    /// Eat or use one unit of `item`, returning false when it has no consumable effect.
    pub fn consume_item(&mut self, item: &ItemDef, cooked: bool) -> bool {
        if !item.is_consumable() || !self.has_item(&item.id) {
            return false;
        }
        for (target, delta) in item.consumption_deltas(cooked) {
            self.stats.adjust(target, delta);
        }
        self.remove_item(&item.id, 1);
        self.clamp();
        true
    }

    /// Evaluate terminal conditions in priority order.
    #[must_use]
    pub fn check_game_over(&self, map: &MapGraph) -> Option<Ending> {
        let stats = &self.stats;
        if stats.health <= 0.0 {
            Some(Ending::Death)
        } else if stats.sanity <= 0.0 {
            Some(Ending::MentalCollapse)
        } else if stats.temperature < HYPOTHERMIA_DEATH_TEMP {
            Some(Ending::Hypothermia)
        } else if stats.hunger <= 0.0 {
            Some(Ending::Starvation)
        } else if stats.thirst <= 0.0 {
            Some(Ending::Dehydration)
        } else if map
            .get(&self.current_node_id)
            .is_some_and(crate::map::MapNode::is_terminal)
        {
            Some(Ending::Victory)
        } else {
            None
        }
    }

    /// Mark the run finished and freeze the statistics.
    pub fn finish(&mut self, ending: Ending) {
        self.ending = Some(ending);
        self.statistics.days_survived = self.game_time;
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.ending.is_some()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::field_reassign_with_default)]
    use super::*;
    use crate::map::{MapNode, Terrain};

    fn line_map() -> MapGraph {
        let node = |id: &str, next: &[&str]| MapNode {
            id: id.to_string(),
            name: id.to_string(),
            altitude: 2_000.0,
            terrain: Terrain::Normal,
            distance_to_next: 5.0,
            connections: next.iter().map(|n| (*n).to_string()).collect(),
            retreat: false,
            description: String::new(),
        };
        MapGraph::from_nodes(vec![node("start", &["end"]), node("end", &[])]).unwrap()
    }

    #[test]
    fn default_state_matches_new_game_values() {
        let state = GameState::default();
        assert!((state.stats.temperature - START_BODY_TEMP).abs() < f64::EPSILON);
        assert_eq!(state.day_time, START_HOUR);
        assert_eq!(state.action_points, DAILY_ACTION_POINTS);
        assert_eq!(state.money, START_MONEY);
        assert_eq!(state.current_node_id, START_NODE_ID);
        assert_eq!(state.character_id, DEFAULT_CHARACTER_ID);
    }

    #[test]
    fn rollover_resets_action_points_once_per_day() {
        let mut state = GameState::default();
        state.action_points = 0;
        state.update_time(15);
        assert_eq!(state.day_time, 23);
        assert_eq!(state.action_points, 0);
        state.update_time(1);
        assert_eq!(state.day_time, 0);
        assert_eq!(state.game_time, 1);
        assert_eq!(state.action_points, DAILY_ACTION_POINTS);

        state.action_points = 3;
        state.update_time(23);
        assert_eq!(state.action_points, 3);
        state.update_time(49);
        assert_eq!(state.game_time, 4);
        assert_eq!(state.day_time, 0);
    }

    #[test]
    fn game_over_priority_prefers_health() {
        let map = line_map();
        let mut state = GameState::default();
        state.stats.health = 0.0;
        state.stats.sanity = 0.0;
        assert_eq!(state.check_game_over(&map), Some(Ending::Death));

        state.stats.health = 50.0;
        assert_eq!(state.check_game_over(&map), Some(Ending::MentalCollapse));

        state.stats.sanity = 50.0;
        state.stats.temperature = 31.5;
        state.stats.hunger = 0.0;
        assert_eq!(state.check_game_over(&map), Some(Ending::Hypothermia));

        state.stats.temperature = 36.0;
        assert_eq!(state.check_game_over(&map), Some(Ending::Starvation));

        state.stats.hunger = 50.0;
        state.stats.thirst = 0.0;
        assert_eq!(state.check_game_over(&map), Some(Ending::Dehydration));

        state.stats.thirst = 50.0;
        assert_eq!(state.check_game_over(&map), None);
        state.current_node_id = "end".into();
        assert_eq!(state.check_game_over(&map), Some(Ending::Victory));
    }

    #[test]
    fn inventory_never_keeps_empty_entries() {
        let mut state = GameState::default();
        state.add_item("candy", 2);
        state.equipment.insert("candy".into());
        assert!(state.remove_item("candy", 5));
        assert!(!state.has_item("candy"));
        assert!(state.equipment.is_empty());
        assert!(!state.remove_item("candy", 1));
    }

    #[test]
    fn reset_keep_setup_preserves_choices() {
        let mut state = GameState::default();
        state.character_id = "student".into();
        state.season = Season::Winter;
        state.money = 5;
        state.reset_keep_setup();
        assert_eq!(state.character_id, "student");
        assert_eq!(state.season, Season::Winter);
        assert_eq!(state.money, START_MONEY);
    }

    #[test]
    fn save_document_round_trips_triggered_events_as_list() {
        let mut state = GameState::default();
        state.triggered_events.insert("blizzard".into());
        state.triggered_events.insert("abandoned_camp".into());
        let json = serde_json::to_value(&state).unwrap();
        assert!(json["triggered_events"].is_array());
        let back: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
