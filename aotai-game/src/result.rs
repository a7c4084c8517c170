//! End-of-run summary and rank title.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{HYPOTHERMIA_RANK_TEMP, RESILIENT_MIN_DAYS, SPEED_RUN_MAX_DAYS};
use crate::state::{Ending, GameState};

/// Title awarded on the result screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Legend,
    SpeedRunner,
    Rookie,
    Resilient,
    HypothermiaVictim,
}

impl Rank {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legend => "legend",
            Self::SpeedRunner => "speed_runner",
            Self::Rookie => "rookie",
            Self::Resilient => "resilient",
            Self::HypothermiaVictim => "hypothermia_victim",
        }
    }

    #[must_use]
    pub const fn i18n_key(self) -> &'static str {
        match self {
            Self::Legend => "result.rank.legend",
            Self::SpeedRunner => "result.rank.speed_runner",
            Self::Rookie => "result.rank.rookie",
            Self::Resilient => "result.rank.resilient",
            Self::HypothermiaVictim => "result.rank.hypothermia_victim",
        }
    }

    /// Later rules override earlier ones.
    #[must_use]
    pub fn for_run(ending: Ending, days: u32, lowest_temp: f64) -> Self {
        if ending.is_win() {
            if days <= SPEED_RUN_MAX_DAYS {
                Self::SpeedRunner
            } else {
                Self::Legend
            }
        } else {
            let mut rank = Self::Rookie;
            if days > RESILIENT_MIN_DAYS {
                rank = Self::Resilient;
            }
            if lowest_temp < HYPOTHERMIA_RANK_TEMP {
                rank = Self::HypothermiaVictim;
            }
            rank
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics shown once a run has ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub ending: Ending,
    pub headline: String,
    pub days_survived: u32,
    pub lowest_temp: f64,
    pub lowest_sanity: f64,
    pub money_left: i64,
    pub max_altitude: f64,
    pub total_distance: f64,
    pub rank: Rank,
}

/// Summarize a finished run; `None` while the run is still going.
#[must_use]
pub fn result_summary(state: &GameState) -> Option<ResultSummary> {
    let ending = state.ending?;
    let stats = &state.statistics;
    Some(ResultSummary {
        ending,
        headline: ending.message().to_string(),
        days_survived: stats.days_survived,
        lowest_temp: stats.lowest_temp,
        lowest_sanity: stats.lowest_sanity,
        money_left: state.money,
        max_altitude: stats.max_altitude,
        total_distance: state.total_distance,
        rank: Rank::for_run(ending, stats.days_survived, stats.lowest_temp),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::field_reassign_with_default)]
    use super::*;

    #[test]
    fn wins_rank_by_speed() {
        assert_eq!(Rank::for_run(Ending::Victory, 4, 36.0), Rank::SpeedRunner);
        assert_eq!(Rank::for_run(Ending::Victory, 5, 36.0), Rank::SpeedRunner);
        assert_eq!(Rank::for_run(Ending::Retreated, 6, 33.0), Rank::Legend);
    }

    #[test]
    fn losses_take_the_last_matching_rank() {
        assert_eq!(Rank::for_run(Ending::Starvation, 2, 36.0), Rank::Rookie);
        assert_eq!(Rank::for_run(Ending::Death, 4, 36.0), Rank::Resilient);
        assert_eq!(
            Rank::for_run(Ending::Hypothermia, 4, 31.9),
            Rank::HypothermiaVictim
        );
        assert_eq!(
            Rank::for_run(Ending::Death, 1, 33.5),
            Rank::HypothermiaVictim
        );
    }

    #[test]
    fn summary_requires_an_ending() {
        let mut state = GameState::default();
        assert!(result_summary(&state).is_none());
        state.game_time = 7;
        state.money = 420;
        state.total_distance = 31.5;
        state.finish(Ending::Victory);
        let summary = result_summary(&state).unwrap();
        assert_eq!(summary.days_survived, 7);
        assert_eq!(summary.rank, Rank::Legend);
        assert_eq!(summary.money_left, 420);
        assert!((summary.total_distance - 31.5).abs() < f64::EPSILON);
    }
}
