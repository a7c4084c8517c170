//! Weather categories, their effects, and the seasonal Markov transition.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::season::Season;

/// Weather conditions on the ridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Fog,
    Rain,
    Snow,
    Storm,
}

impl Weather {
    pub const ALL: [Self; 6] = [
        Self::Sunny,
        Self::Cloudy,
        Self::Fog,
        Self::Rain,
        Self::Snow,
        Self::Storm,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Fog => "fog",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Storm => "storm",
        }
    }

    #[must_use]
    pub const fn i18n_key(self) -> &'static str {
        match self {
            Self::Sunny => "weather.sunny",
            Self::Cloudy => "weather.cloudy",
            Self::Fog => "weather.fog",
            Self::Rain => "weather.rain",
            Self::Snow => "weather.snow",
            Self::Storm => "weather.storm",
        }
    }

    /// Temperature offset and stamina multiplier for this weather.
    #[must_use]
    pub const fn effect(self) -> WeatherEffect {
        match self {
            Self::Sunny => WeatherEffect::new(2.0, 1.0),
            Self::Cloudy => WeatherEffect::new(0.0, 1.0),
            Self::Fog => WeatherEffect::new(-1.0, 1.1),
            Self::Rain => WeatherEffect::new(-3.0, 1.3),
            Self::Snow => WeatherEffect::new(-5.0, 1.5),
            Self::Storm => WeatherEffect::new(-10.0, 2.0),
        }
    }

    /// Bonus wind levels contributed by this weather.
    #[must_use]
    pub const fn wind_bonus(self) -> u8 {
        match self {
            Self::Storm => 4,
            Self::Snow => 2,
            Self::Rain => 1,
            Self::Sunny | Self::Cloudy | Self::Fog => 0,
        }
    }

    /// Snow is on the ground or falling.
    #[must_use]
    pub const fn is_snowy(self) -> bool {
        matches!(self, Self::Snow | Self::Storm)
    }

    /// Base transition row in table order.
    const fn transitions(self) -> &'static [(Self, f64)] {
        match self {
            Self::Sunny => &[
                (Self::Sunny, 0.5),
                (Self::Cloudy, 0.3),
                (Self::Fog, 0.1),
                (Self::Rain, 0.1),
            ],
            Self::Cloudy => &[
                (Self::Sunny, 0.3),
                (Self::Cloudy, 0.4),
                (Self::Fog, 0.1),
                (Self::Rain, 0.2),
            ],
            Self::Fog => &[
                (Self::Sunny, 0.2),
                (Self::Cloudy, 0.3),
                (Self::Fog, 0.4),
                (Self::Rain, 0.1),
            ],
            Self::Rain => &[
                (Self::Cloudy, 0.4),
                (Self::Rain, 0.4),
                (Self::Storm, 0.1),
                (Self::Sunny, 0.1),
            ],
            Self::Snow => &[(Self::Cloudy, 0.3), (Self::Snow, 0.5), (Self::Storm, 0.2)],
            Self::Storm => &[(Self::Snow, 0.5), (Self::Cloudy, 0.5)],
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|weather| weather.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown weather `{s}`"))
    }
}

/// Per-weather modifiers applied to temperature and hiking cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherEffect {
    pub temp_offset: f64,
    pub stamina_mult: f64,
}

impl WeatherEffect {
    const fn new(temp_offset: f64, stamina_mult: f64) -> Self {
        Self {
            temp_offset,
            stamina_mult,
        }
    }
}

/// Current weather plus how many consecutive transitions kept it unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeatherState {
    pub current: Weather,
    #[serde(default)]
    pub duration: u32,
}

impl WeatherState {
    /// Record a transition result.
    pub fn advance(&mut self, next: Weather) {
        if next == self.current {
            self.duration = self.duration.saturating_add(1);
        } else {
            self.current = next;
            self.duration = 0;
        }
    }

    /// Replace the weather outright (forced by events or the environment).
    pub fn force(&mut self, weather: Weather) {
        if weather != self.current {
            self.current = weather;
            self.duration = 0;
        }
    }
}

pub type TransitionRow = SmallVec<[(Weather, f64); 6]>;

fn seasonal_multiplier(season: Season, target: Weather) -> f64 {
    match (season, target) {
        (Season::Summer, Weather::Rain | Weather::Storm) => 1.5,
        (Season::Summer, Weather::Snow) => 0.1,
        (Season::Winter, Weather::Snow) => 2.0,
        (Season::Winter, Weather::Storm) => 1.5,
        (Season::Winter, Weather::Rain) => 0.1,
        (Season::Autumn, Weather::Sunny) => 1.5,
        _ => 1.0,
    }
}

/// Transition row for `current` reweighted by season and renormalized.
///
/// Returns an empty row when every weight vanishes.
#[must_use]
pub fn reweighted_row(current: Weather, season: Season) -> TransitionRow {
    let mut row: TransitionRow = current
        .transitions()
        .iter()
        .map(|&(target, weight)| (target, weight * seasonal_multiplier(season, target)))
        .collect();
    let total: f64 = row.iter().map(|(_, weight)| weight).sum();
    if total <= 0.0 {
        return TransitionRow::new();
    }
    for entry in &mut row {
        entry.1 /= total;
    }
    row
}

/// Draw the next weather from the seasonal transition row.
pub fn next_weather<R>(current: Weather, season: Season, rng: &mut R) -> Weather
where
    R: Rng + ?Sized,
{
    let row = reweighted_row(current, season);
    if row.is_empty() {
        return Weather::Sunny;
    }
    let roll = rng.r#gen::<f64>();
    let mut cumulative = 0.0;
    for (target, weight) in &row {
        cumulative += weight;
        if roll <= cumulative {
            log::debug!("weather {current} -> {target} (roll {roll:.3}, season {season})");
            return *target;
        }
    }
    Weather::Sunny
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn rows_sum_to_one_for_every_season() {
        for season in Season::ALL {
            for weather in Weather::ALL {
                let row = reweighted_row(weather, season);
                let sum: f64 = row.iter().map(|(_, w)| w).sum();
                assert!((sum - 1.0).abs() < 1e-9, "{weather} in {season} sums to {sum}");
            }
        }
    }

    #[test]
    fn summer_reweights_rain_row() {
        let row = reweighted_row(Weather::Rain, Season::Summer);
        // cloudy .4, rain .6, storm .15, sunny .1 => total 1.25
        let rain = row.iter().find(|(w, _)| *w == Weather::Rain).unwrap().1;
        assert!((rain - 0.6 / 1.25).abs() < 1e-9);
    }

    #[test]
    fn storm_never_follows_sunny() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            let next = next_weather(Weather::Sunny, Season::Winter, &mut rng);
            assert_ne!(next, Weather::Storm);
            assert_ne!(next, Weather::Snow);
        }
    }

    #[test]
    fn state_tracks_duration() {
        let mut state = WeatherState::default();
        state.advance(Weather::Sunny);
        state.advance(Weather::Sunny);
        assert_eq!(state.duration, 2);
        state.advance(Weather::Fog);
        assert_eq!(state, WeatherState { current: Weather::Fog, duration: 0 });
        state.force(Weather::Fog);
        assert_eq!(state.duration, 0);
    }

    #[test]
    fn effects_cover_table() {
        assert!((Weather::Storm.effect().temp_offset + 10.0).abs() < f64::EPSILON);
        assert!((Weather::Fog.effect().stamina_mult - 1.1).abs() < f64::EPSILON);
        assert_eq!("Snow".parse::<Weather>().unwrap(), Weather::Snow);
    }
}
