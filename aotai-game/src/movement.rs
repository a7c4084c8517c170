//! Hiking distance and stamina cost.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::characters::CharacterBuffs;
use crate::constants::{
    ALTITUDE_PENALTY_SPAN, ALTITUDE_PENALTY_START, BASE_SPEED_KMH, BASE_STAMINA_COST,
    COLD_COST_PER_DEGREE, LIGHT_PACK_BONUS, LIGHT_PACK_RATIO, MAX_WEIGHT_BASE, MIN_ALTITUDE_FACTOR,
    MIN_WEIGHT_FACTOR, OVERWEIGHT_PENALTY_PER_KG, RANDOM_FACTOR_MAX, RANDOM_FACTOR_MIN,
    WIND_COST_PER_LEVEL,
};
use crate::map::Terrain;
use crate::state::Stats;
use crate::weather::Weather;

#[must_use]
pub fn altitude_factor(altitude: f64) -> f64 {
    let excess = (altitude - ALTITUDE_PENALTY_START).max(0.0);
    (1.0 - excess / ALTITUDE_PENALTY_SPAN).max(MIN_ALTITUDE_FACTOR)
}

/// Light packs speed the hiker up; overweight packs slow them down.
#[must_use]
pub fn weight_factor(carried: f64) -> f64 {
    if carried < MAX_WEIGHT_BASE * LIGHT_PACK_RATIO {
        LIGHT_PACK_BONUS
    } else if carried > MAX_WEIGHT_BASE {
        let overweight = carried - MAX_WEIGHT_BASE;
        (1.0 - overweight * OVERWEIGHT_PENALTY_PER_KG).max(MIN_WEIGHT_FACTOR)
    } else {
        1.0
    }
}

#[must_use]
pub const fn wind_factor(wind_level: u8) -> f64 {
    if wind_level >= 8 {
        0.5
    } else if wind_level >= 6 {
        0.8
    } else {
        1.0
    }
}

#[must_use]
pub fn temp_factor(env_temp: f64) -> f64 {
    if env_temp < -20.0 {
        0.7
    } else if env_temp < -10.0 {
        0.9
    } else {
        1.0
    }
}

/// Condition of the hiker scaled by the character's move-speed buff.
#[must_use]
pub fn status_factor(stats: &Stats, move_speed_mult: f64) -> f64 {
    let mut factor = 1.0;
    if stats.health > 80.0 && stats.stamina > 80.0 {
        factor += 0.2;
    }
    if stats.health < 50.0 {
        factor -= 0.2;
    }
    if stats.hunger < 30.0 {
        factor -= 0.1;
    }
    if stats.thirst < 30.0 {
        factor -= 0.1;
    }
    factor * move_speed_mult
}

/// Inputs to one hiking hour.
#[derive(Debug, Clone, Copy)]
pub struct HikeConditions<'a> {
    pub terrain: Terrain,
    pub altitude: f64,
    pub carried_weight: f64,
    pub wind_level: u8,
    pub env_temp: f64,
    pub weather: Weather,
    pub stats: &'a Stats,
    pub buffs: &'a CharacterBuffs,
}

/// Every factor of a resolved hike, kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HikeFactors {
    pub terrain: f64,
    pub altitude: f64,
    pub weight: f64,
    pub wind: f64,
    pub temp: f64,
    pub random: f64,
    pub status: f64,
}

impl HikeFactors {
    /// Compute all factors, drawing the random jitter from `rng`.
    pub fn roll<R>(conditions: &HikeConditions<'_>, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::with_random(
            conditions,
            rng.gen_range(RANDOM_FACTOR_MIN..=RANDOM_FACTOR_MAX),
        )
    }

    #[must_use]
    pub fn with_random(conditions: &HikeConditions<'_>, random: f64) -> Self {
        Self {
            terrain: conditions.terrain.speed_factor(),
            altitude: altitude_factor(conditions.altitude),
            weight: weight_factor(conditions.carried_weight),
            wind: wind_factor(conditions.wind_level),
            temp: temp_factor(conditions.env_temp),
            random,
            status: status_factor(conditions.stats, conditions.buffs.move_speed_mult()),
        }
    }

    /// Kilometres covered in one hour.
    #[must_use]
    pub fn distance(&self) -> f64 {
        BASE_SPEED_KMH
            * self.terrain
            * self.altitude
            * self.weight
            * self.wind
            * self.temp
            * self.random
            * self.status
    }
}

/// Stamina spent on one hiking hour.
#[must_use]
pub fn stamina_cost(conditions: &HikeConditions<'_>) -> f64 {
    let terrain = conditions.terrain.speed_factor();
    let altitude = altitude_factor(conditions.altitude);
    let wind_cost = 1.0 + f64::from(conditions.wind_level) * WIND_COST_PER_LEVEL;
    let cold_cost = if conditions.env_temp < 0.0 {
        1.0 + conditions.env_temp.abs() * COLD_COST_PER_DEGREE
    } else {
        1.0
    };
    BASE_STAMINA_COST
        * (1.0 + (1.0 - terrain) + (1.0 - altitude))
        * conditions.weather.effect().stamina_mult
        * wind_cost
        * cold_cost
        * conditions.buffs.stamina_cost_mult()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn stats(level: f64) -> Stats {
        Stats {
            stamina: level,
            hunger: level,
            thirst: level,
            sanity: level,
            health: level,
            temperature: 36.5,
        }
    }

    #[test]
    fn meadow_at_2000_light_pack_covers_2_64_times_jitter() {
        let stats = stats(90.0);
        let buffs = CharacterBuffs::default();
        let conditions = HikeConditions {
            terrain: Terrain::Meadow,
            altitude: 2_000.0,
            carried_weight: 8.0,
            wind_level: 1,
            env_temp: 10.0,
            weather: Weather::Sunny,
            stats: &stats,
            buffs: &buffs,
        };
        let factors = HikeFactors::with_random(&conditions, 1.0);
        assert!((factors.distance() - 2.64).abs() < 1e-9);

        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            let rolled = HikeFactors::roll(&conditions, &mut rng);
            assert!((RANDOM_FACTOR_MIN..=RANDOM_FACTOR_MAX).contains(&rolled.random));
            assert!((rolled.distance() - 2.64 * rolled.random).abs() < 1e-9);
        }
    }

    #[test]
    fn factor_thresholds_pick_strongest() {
        assert!((wind_factor(9) - 0.5).abs() < f64::EPSILON);
        assert!((wind_factor(6) - 0.8).abs() < f64::EPSILON);
        assert!((temp_factor(-25.0) - 0.7).abs() < f64::EPSILON);
        assert!((temp_factor(-15.0) - 0.9).abs() < f64::EPSILON);
        assert!((altitude_factor(5_000.0) - 0.5).abs() < f64::EPSILON);
        assert!((altitude_factor(3_000.0) - 0.9).abs() < 1e-9);
        assert!((weight_factor(30.0) - 0.5).abs() < 1e-9);
        assert!((weight_factor(22.0) - 0.9).abs() < 1e-9);
        assert!((weight_factor(18.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stamina_cost_compounds_conditions() {
        let stats = stats(90.0);
        let buffs = CharacterBuffs {
            stamina_cost_mult: Some(0.8),
            ..CharacterBuffs::default()
        };
        let conditions = HikeConditions {
            terrain: Terrain::Ridge,
            altitude: 3_000.0,
            carried_weight: 10.0,
            wind_level: 4,
            env_temp: -10.0,
            weather: Weather::Snow,
            stats: &stats,
            buffs: &buffs,
        };
        // 15 * (1 + 0.5 + 0.1) * 1.5 * 1.2 * 1.2 * 0.8
        let expected = 15.0 * 1.6 * 1.5 * 1.2 * 1.2 * 0.8;
        assert!((stamina_cost(&conditions) - expected).abs() < 1e-9);
    }
}
