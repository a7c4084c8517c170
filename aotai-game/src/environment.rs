//! Ambient conditions and their physiological consequences.
use serde::{Deserialize, Serialize};

use crate::constants::{
    COMFORT_THRESHOLD, FEAST_RECOVERY, FED_RECOVERY, HEAT_LOSS_PER_DEGREE, HUNGRY_HEAT_LOSS,
    LAPSE_RATE_PER_KM, NIGHT_TEMP_PENALTY, NORMAL_BODY_TEMP, STARVING_HEAT_LOSS, WARM_RECOVERY,
    WELL_FED_HEAT_OFFSET, WIND_ALTITUDE_STEPS, WIND_BASE, WIND_MAX,
};
use crate::data::Catalogs;
use crate::map::MapNode;
use crate::state::GameState;
use crate::weather::Weather;

const NIGHT_TEMP_BEFORE: u32 = 6;
const NIGHT_TEMP_AFTER: u32 = 20;

/// Derived ambient values for one node at one moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub env_temp: f64,
    /// Weather after the freezing-rain upgrade.
    pub weather: Weather,
    pub wind_level: u8,
}

/// Ambient temperature; freezing rain turns to snow and is recomputed once.
#[must_use]
pub fn ambient_temperature(
    node: &MapNode,
    season_base_temp: f64,
    weather: Weather,
    hour: u32,
) -> (f64, Weather) {
    let base = season_base_temp - node.altitude / 1000.0 * LAPSE_RATE_PER_KM;
    let night = if hour < NIGHT_TEMP_BEFORE || hour > NIGHT_TEMP_AFTER {
        NIGHT_TEMP_PENALTY
    } else {
        0.0
    };
    let temp = base + weather.effect().temp_offset + night;
    if temp < 0.0 && weather == Weather::Rain {
        let upgraded = Weather::Snow;
        return (base + upgraded.effect().temp_offset + night, upgraded);
    }
    (temp, weather)
}

#[must_use]
pub fn wind_level(node: &MapNode, weather: Weather) -> u8 {
    let altitude_steps = WIND_ALTITUDE_STEPS
        .iter()
        .filter(|step| node.altitude > **step)
        .count();
    let altitude_steps = u8::try_from(altitude_steps).unwrap_or(u8::MAX);
    WIND_BASE
        .saturating_add(altitude_steps)
        .saturating_add(weather.wind_bonus())
        .min(WIND_MAX)
}

/// Comfort threshold lowered by the `temp_protection` of everything carried.
#[must_use]
pub fn gear_warmth(total_protection: f64) -> f64 {
    COMFORT_THRESHOLD - total_protection
}

#[must_use]
pub fn readings(node: &MapNode, season_base_temp: f64, weather: Weather, hour: u32) -> Readings {
    let (env_temp, weather) = ambient_temperature(node, season_base_temp, weather, hour);
    Readings {
        env_temp,
        weather,
        wind_level: wind_level(node, weather),
    }
}

/// Heat loss or recovery for one tick.
pub fn update_body_temperature(state: &mut GameState, env_temp: f64, gear_warmth: f64) {
    let hunger = state.stats.hunger;
    let mut heat_loss = 0.0;
    if env_temp < gear_warmth {
        heat_loss += (gear_warmth - env_temp) * HEAT_LOSS_PER_DEGREE;
    }
    if hunger < 20.0 {
        heat_loss += HUNGRY_HEAT_LOSS;
    }
    if hunger <= 0.0 {
        heat_loss += STARVING_HEAT_LOSS;
    }

    if heat_loss > 0.0 {
        state.stats.temperature -= heat_loss;
        if hunger > 80.0 {
            state.stats.temperature += WELL_FED_HEAT_OFFSET;
        }
    } else if state.stats.temperature < NORMAL_BODY_TEMP {
        let mut recovery = 0.0;
        if env_temp >= gear_warmth {
            recovery += WARM_RECOVERY;
        }
        if hunger > 70.0 {
            recovery += FED_RECOVERY;
        }
        if hunger > 90.0 {
            recovery += FEAST_RECOVERY;
        }
        state.stats.temperature += recovery;
    }
    state.clamp();
    state.record_lows();
}

/// Cold, injury, hunger, and thirst wear on sanity; comfort restores it slowly.
pub fn update_sanity_drain(state: &mut GameState) {
    let stats = state.stats;
    let mut drain = 0.0;
    if stats.temperature < 35.0 {
        drain += 2.0;
    }
    if stats.temperature < 34.0 {
        drain += 5.0;
    }
    if stats.health < 50.0 {
        drain += 1.0;
    }
    if stats.hunger < 20.0 {
        drain += 1.0;
    }
    if stats.thirst < 20.0 {
        drain += 1.0;
    }

    if drain > 0.0 {
        state.stats.sanity -= drain;
    } else if stats.hunger > 80.0 && stats.thirst > 80.0 && stats.temperature >= 36.5 {
        state.stats.sanity += 1.0;
    }
    state.clamp();
    state.record_lows();
}

/// Recompute ambient readings for the current node without touching physiology.
///
/// Returns false when the current node is not in the map.
pub fn observe(state: &mut GameState, catalogs: &Catalogs) -> bool {
    let Some(node) = catalogs.map.get(&state.current_node_id) else {
        log::warn!("current node `{}` missing from map", state.current_node_id);
        return false;
    };
    let base = catalogs.seasons.base_temp(state.season);
    let current = readings(node, base, state.weather.current, state.day_time);
    state.env_temp = current.env_temp;
    state.weather.force(current.weather);
    state.wind_level = current.wind_level;
    state.statistics.max_altitude = state.statistics.max_altitude.max(node.altitude);
    true
}

/// Recompute readings then run the body-temperature and sanity ticks.
pub fn refresh(state: &mut GameState, catalogs: &Catalogs) {
    if !observe(state, catalogs) {
        return;
    }
    let warmth = gear_warmth(catalogs.items.total_protection(&state.inventory));
    update_body_temperature(state, state.env_temp, warmth);
    update_sanity_drain(state);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltitudeBand {
    Moderate,
    High,
    Extreme,
}

impl AltitudeBand {
    #[must_use]
    pub fn classify(altitude: f64) -> Self {
        if altitude >= 3_000.0 {
            Self::Extreme
        } else if altitude >= 2_500.0 {
            Self::High
        } else {
            Self::Moderate
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBand {
    Hot,
    Mild,
    Freezing,
    Severe,
    Extreme,
}

impl TemperatureBand {
    #[must_use]
    pub fn classify(env_temp: f64) -> Self {
        if env_temp > 30.0 {
            Self::Hot
        } else if env_temp < -20.0 {
            Self::Extreme
        } else if env_temp < -10.0 {
            Self::Severe
        } else if env_temp < 0.0 {
            Self::Freezing
        } else {
            Self::Mild
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindBand {
    Calm,
    Breeze,
    Strong,
    Gale,
}

impl WindBand {
    #[must_use]
    pub const fn classify(level: u8) -> Self {
        match level {
            0..=3 => Self::Calm,
            4..=5 => Self::Breeze,
            6..=7 => Self::Strong,
            _ => Self::Gale,
        }
    }
}
