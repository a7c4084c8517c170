//! Narrative events: definitions, trigger filtering, and choice effects.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::constants::{DEFAULT_EVENT_CHANCE, HOURS_PER_DAY};
use crate::data::{CatalogError, CatalogKind};
use crate::items::StatTarget;
use crate::map::{MapGraph, Terrain};
use crate::state::GameState;
use crate::weather::Weather;

/// Explore action that asked for an event roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionPhase {
    Hike,
    Rest,
    Camp,
}

impl ActionPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hike => "hike",
            Self::Rest => "rest",
            Self::Camp => "camp",
        }
    }
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeatherMatch {
    One(Weather),
    Many(Vec<Weather>),
}

impl WeatherMatch {
    #[must_use]
    pub fn matches(&self, weather: Weather) -> bool {
        match self {
            Self::One(expected) => *expected == weather,
            Self::Many(options) => options.contains(&weather),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Day,
    Night,
}

const fn default_chance() -> f64 {
    DEFAULT_EVENT_CHANCE
}

/// Conditions that must all hold for an event to be eligible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConditions {
    #[serde(default)]
    pub terrain: Option<Terrain>,
    #[serde(default)]
    pub weather: Option<WeatherMatch>,
    #[serde(default)]
    pub time: Option<TimeOfDay>,
    /// Inclusive hour range.
    #[serde(default)]
    pub time_range: Option<[u32; 2]>,
    #[serde(default)]
    pub altitude_min: Option<f64>,
    #[serde(default)]
    pub sanity_max: Option<f64>,
    #[serde(default)]
    pub phase: Option<ActionPhase>,
    #[serde(default = "default_chance")]
    pub chance: f64,
}

impl Default for TriggerConditions {
    fn default() -> Self {
        Self {
            terrain: None,
            weather: None,
            time: None,
            time_range: None,
            altitude_min: None,
            sanity_max: None,
            phase: None,
            chance: DEFAULT_EVENT_CHANCE,
        }
    }
}

/// Special handlers a choice may invoke instead of plain stat effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialAction {
    Scavenge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceRequirements {
    #[serde(default)]
    pub items: Vec<String>,
}

/// Closed set of effects an event choice can carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceEffects {
    #[serde(default)]
    pub stamina: Option<f64>,
    #[serde(default)]
    pub sanity: Option<f64>,
    #[serde(default)]
    pub health: Option<f64>,
    #[serde(default)]
    pub thirst: Option<f64>,
    #[serde(default)]
    pub hunger: Option<f64>,
    #[serde(default)]
    pub karma: Option<i32>,
    #[serde(default)]
    pub remove_item: Option<String>,
    #[serde(default)]
    pub change_weather: Option<Weather>,
    #[serde(default)]
    pub action_points: Option<i32>,
    /// Shown to the player only; hiking cost is not affected.
    #[serde(default)]
    pub stamina_cost_multiplier: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub special_action: Option<SpecialAction>,
}

/// One effect in application order.
#[derive(Debug, Clone, PartialEq)]
pub enum EventEffect {
    Stat(StatTarget, f64),
    Karma(i32),
    RemoveItem(String),
    ChangeWeather(Weather),
    ActionPoints(i32),
    StaminaCostMultiplier(f64),
    Message(String),
    Special(SpecialAction),
}

impl ChoiceEffects {
    /// Application table: stats first, then karma, items, weather, action points, notes.
    #[must_use]
    pub fn to_effects(&self) -> Vec<EventEffect> {
        let mut effects = Vec::new();
        let stats = [
            (StatTarget::Stamina, self.stamina),
            (StatTarget::Sanity, self.sanity),
            (StatTarget::Health, self.health),
            (StatTarget::Thirst, self.thirst),
            (StatTarget::Hunger, self.hunger),
        ];
        for (target, delta) in stats {
            if let Some(delta) = delta {
                effects.push(EventEffect::Stat(target, delta));
            }
        }
        if let Some(karma) = self.karma {
            effects.push(EventEffect::Karma(karma));
        }
        if let Some(item) = &self.remove_item {
            effects.push(EventEffect::RemoveItem(item.clone()));
        }
        if let Some(weather) = self.change_weather {
            effects.push(EventEffect::ChangeWeather(weather));
        }
        if let Some(points) = self.action_points {
            effects.push(EventEffect::ActionPoints(points));
        }
        if let Some(mult) = self.stamina_cost_multiplier {
            effects.push(EventEffect::StaminaCostMultiplier(mult));
        }
        if let Some(message) = &self.message {
            effects.push(EventEffect::Message(message.clone()));
        }
        if let Some(action) = self.special_action {
            effects.push(EventEffect::Special(action));
        }
        effects
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventChoice {
    pub text: String,
    #[serde(default)]
    pub requirements: ChoiceRequirements,
    #[serde(default)]
    pub effects: ChoiceEffects,
}

impl EventChoice {
    /// All required items are held.
    #[must_use]
    pub fn requirements_met(&self, state: &GameState) -> bool {
        self.requirements.items.iter().all(|id| state.has_item(id))
    }

    #[must_use]
    pub fn special_action(&self) -> Option<SpecialAction> {
        self.effects.special_action
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventDefinition {
    #[serde(rename = "event_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, rename = "trigger_conditions", alias = "trigger")]
    pub trigger: TriggerConditions,
    pub choices: Vec<EventChoice>,
}

/// Caller-supplied context for an event roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventContext {
    pub phase: Option<ActionPhase>,
}

impl EventContext {
    #[must_use]
    pub const fn for_phase(phase: ActionPhase) -> Self {
        Self { phase: Some(phase) }
    }
}

impl EventDefinition {
    /// Whether every present trigger condition passes.
    #[must_use]
    pub fn is_eligible(
        &self,
        state: &GameState,
        terrain: Terrain,
        altitude: f64,
        context: EventContext,
    ) -> bool {
        if self.unique && state.triggered_events.contains(&self.id) {
            return false;
        }
        let trigger = &self.trigger;
        if trigger.terrain.is_some_and(|expected| expected != terrain) {
            return false;
        }
        if trigger
            .weather
            .as_ref()
            .is_some_and(|expected| !expected.matches(state.weather.current))
        {
            return false;
        }
        match trigger.time {
            Some(TimeOfDay::Night) if !state.is_night() => return false,
            Some(TimeOfDay::Day) if state.is_night() => return false,
            _ => {}
        }
        if let Some([start, end]) = trigger.time_range
            && !(start..=end).contains(&state.day_time)
        {
            return false;
        }
        if trigger.altitude_min.is_some_and(|min| altitude < min) {
            return false;
        }
        if trigger
            .sanity_max
            .is_some_and(|max| state.stats.sanity > max)
        {
            return false;
        }
        if let (Some(required), Some(phase)) = (trigger.phase, context.phase)
            && required != phase
        {
            return false;
        }
        true
    }
}

/// Read-only list of narrative events in authoring order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCatalog {
    events: Vec<EventDefinition>,
}

impl EventCatalog {
    /// Parse and validate the event list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON or unknown effect keys and
    /// [`CatalogError::Invalid`] for duplicate ids, events without choices, chances
    /// outside `[0, 1]`, bad hour ranges, or effects that grant action points.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let events: Vec<EventDefinition> =
            serde_json::from_str(json).map_err(|source| CatalogError::Parse {
                catalog: CatalogKind::Events,
                source,
            })?;
        Self::from_events(events)
    }

    /// # Errors
    ///
    /// See [`EventCatalog::from_json`].
    pub fn from_events(events: Vec<EventDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for event in &events {
            let invalid = |reason: &str| {
                CatalogError::invalid(CatalogKind::Events, format!("event `{}` {reason}", event.id))
            };
            if !seen.insert(event.id.as_str()) {
                return Err(invalid("is defined twice"));
            }
            if event.choices.is_empty() {
                return Err(invalid("has no choices"));
            }
            if !(0.0..=1.0).contains(&event.trigger.chance) {
                return Err(invalid("has a chance outside [0, 1]"));
            }
            if let Some([start, end]) = event.trigger.time_range
                && (start > end || end >= HOURS_PER_DAY)
            {
                return Err(invalid("has an invalid time range"));
            }
            if event
                .choices
                .iter()
                .any(|choice| choice.effects.action_points.is_some_and(|points| points > 0))
            {
                return Err(invalid("grants action points"));
            }
        }
        Ok(Self { events })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventDefinition> {
        self.events.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Roll for at most one event at the hiker's current position.
///
/// Each eligible event draws once against its own chance; one passing event is
/// then picked uniformly. Returns `None` when the current node is not on the map.
pub fn check_event<'a, R>(
    state: &GameState,
    map: &MapGraph,
    catalog: &'a EventCatalog,
    context: EventContext,
    rng: &mut R,
) -> Option<&'a EventDefinition>
where
    R: Rng + ?Sized,
{
    let node = map.get(&state.current_node_id)?;
    let passing: Vec<&EventDefinition> = catalog
        .iter()
        .filter(|event| event.is_eligible(state, node.terrain, node.altitude, context))
        .filter(|event| rng.r#gen::<f64>() < event.trigger.chance)
        .collect();
    let chosen = passing.choose(rng).copied();
    log::debug!(
        "event roll at {} ({:?}): {} passed, chose {:?}",
        node.id,
        context.phase,
        passing.len(),
        chosen.map(|event| event.id.as_str())
    );
    chosen
}
