use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::camp::ScavengeFind;
use crate::constants::{WARN_HEALTH_BELOW, WARN_SANITY_BELOW, WARN_STAMINA_BELOW};
use crate::items::StatTarget;
use crate::state::Stats;
use crate::weather::Weather;

/// Why a hike needs explicit confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningReason {
    LowHealth,
    LowStamina,
    LowSanity,
}

impl WarningReason {
    #[must_use]
    pub const fn i18n_key(self) -> &'static str {
        match self {
            Self::LowHealth => "warning.low_health",
            Self::LowStamina => "warning.low_stamina",
            Self::LowSanity => "warning.low_sanity",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LowHealth => "health is low",
            Self::LowStamina => "stamina is low",
            Self::LowSanity => "sanity is low",
        }
    }
}

pub type WarningReasons = SmallVec<[WarningReason; 3]>;

/// Every reason the hiker is in no shape to push on.
#[must_use]
pub fn warning_reasons(stats: &Stats) -> WarningReasons {
    let mut reasons = WarningReasons::new();
    if stats.health < WARN_HEALTH_BELOW {
        reasons.push(WarningReason::LowHealth);
    }
    if stats.stamina < WARN_STAMINA_BELOW {
        reasons.push(WarningReason::LowStamina);
    }
    if stats.sanity < WARN_SANITY_BELOW {
        reasons.push(WarningReason::LowSanity);
    }
    reasons
}

/// One visible consequence of an event choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportLine {
    Stat { target: StatTarget, delta: f64 },
    Karma { delta: i32 },
    ItemLost { item_id: String },
    Weather { weather: Weather },
    ActionPoints { delta: i32 },
    /// Advisory only.
    StaminaCost { multiplier: f64 },
    Scavenged { find: ScavengeFind },
}

/// What resolving an event choice did, shown until acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReport {
    pub event_id: String,
    pub choice: usize,
    pub narrative: Option<String>,
    pub changes: Vec<ReportLine>,
}

/// Controller phases; payloads carry what the phase is waiting on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Menu,
    Setup,
    Shop,
    Explore,
    Warning {
        reasons: WarningReasons,
    },
    CookingChoice {
        item_id: String,
    },
    EatSnowConfirm,
    RetreatConfirm,
    Event {
        event_id: String,
    },
    EventResult {
        report: EventReport,
    },
    GameOver,
}

impl Phase {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Setup => "setup",
            Self::Shop => "shop",
            Self::Explore => "explore",
            Self::Warning { .. } => "warning",
            Self::CookingChoice { .. } => "cooking_choice",
            Self::EatSnowConfirm => "eat_snow_confirm",
            Self::RetreatConfirm => "retreat_confirm",
            Self::Event { .. } => "event",
            Self::EventResult { .. } => "event_result",
            Self::GameOver => "game_over",
        }
    }

    /// Phases that wait on a yes/no or choice before play continues.
    #[must_use]
    pub const fn is_modal(&self) -> bool {
        matches!(
            self,
            Self::Warning { .. }
                | Self::CookingChoice { .. }
                | Self::EatSnowConfirm
                | Self::RetreatConfirm
                | Self::Event { .. }
                | Self::EventResult { .. }
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
