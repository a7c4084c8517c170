use serde::{Deserialize, Serialize};

use super::phase::Phase;
use crate::error::Rejection;
use crate::season::Season;

/// Discrete player actions accepted by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    NewGame,
    SelectCharacter { id: String },
    SelectSeason { season: Season },
    ConfirmSetup,
    AdjustCart {
        item_id: String,
        delta: i32,
        #[serde(default = "default_multiplier")]
        multiplier: u32,
    },
    ClearCart,
    Checkout,
    Hike,
    ConfirmWarning { proceed: bool },
    Rest,
    Camp,
    RequestEatSnow,
    EatSnow { confirm: bool },
    UseItem { item_id: String },
    CookingChoice { cook: bool },
    TravelTo { node_id: String },
    Finish,
    UseSpecialAbility,
    ChooseEventOption { index: usize },
    AcknowledgeEventResult,
    Retreat { confirm: bool },
    Save,
    Load,
    ReturnToMenu,
}

const fn default_multiplier() -> u32 {
    1
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewGame => "new_game",
            Self::SelectCharacter { .. } => "select_character",
            Self::SelectSeason { .. } => "select_season",
            Self::ConfirmSetup => "confirm_setup",
            Self::AdjustCart { .. } => "adjust_cart",
            Self::ClearCart => "clear_cart",
            Self::Checkout => "checkout",
            Self::Hike => "hike",
            Self::ConfirmWarning { .. } => "confirm_warning",
            Self::Rest => "rest",
            Self::Camp => "camp",
            Self::RequestEatSnow => "request_eat_snow",
            Self::EatSnow { .. } => "eat_snow",
            Self::UseItem { .. } => "use_item",
            Self::CookingChoice { .. } => "cooking_choice",
            Self::TravelTo { .. } => "travel_to",
            Self::Finish => "finish",
            Self::UseSpecialAbility => "use_special_ability",
            Self::ChooseEventOption { .. } => "choose_event_option",
            Self::AcknowledgeEventResult => "acknowledge_event_result",
            Self::Retreat { .. } => "retreat",
            Self::Save => "save",
            Self::Load => "load",
            Self::ReturnToMenu => "return_to_menu",
        }
    }

    /// Phase guard table.
    #[must_use]
    pub const fn allowed_in(&self, phase: &Phase) -> bool {
        match self {
            Self::NewGame => matches!(phase, Phase::Menu | Phase::GameOver),
            Self::SelectCharacter { .. } | Self::SelectSeason { .. } | Self::ConfirmSetup => {
                matches!(phase, Phase::Setup)
            }
            Self::AdjustCart { .. } | Self::ClearCart | Self::Checkout => {
                matches!(phase, Phase::Shop)
            }
            Self::Hike
            | Self::Rest
            | Self::Camp
            | Self::RequestEatSnow
            | Self::UseItem { .. }
            | Self::TravelTo { .. }
            | Self::Finish
            | Self::UseSpecialAbility
            | Self::Save => matches!(phase, Phase::Explore),
            Self::ConfirmWarning { .. } => matches!(phase, Phase::Warning { .. }),
            Self::EatSnow { .. } => matches!(phase, Phase::EatSnowConfirm),
            Self::CookingChoice { .. } => matches!(phase, Phase::CookingChoice { .. }),
            Self::ChooseEventOption { .. } => matches!(phase, Phase::Event { .. }),
            Self::AcknowledgeEventResult => matches!(phase, Phase::EventResult { .. }),
            Self::Retreat { .. } => matches!(phase, Phase::RetreatConfirm),
            Self::Load => matches!(phase, Phase::Menu | Phase::Explore),
            Self::ReturnToMenu => matches!(
                phase,
                Phase::Setup | Phase::Shop | Phase::Explore | Phase::GameOver
            ),
        }
    }
}

/// How a dispatched command was handled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Applied,
    /// Refused by a guard; nothing changed.
    Rejected(Rejection),
    /// Persistence failed; in-memory state is unchanged.
    Failed(String),
}

/// Outcome returned for every command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    /// Stable message key for presentation layers.
    pub key: &'static str,
    pub message: String,
    pub phase: Phase,
    pub status: CommandStatus,
}

impl CommandResult {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self.status, CommandStatus::Applied)
    }

    #[must_use]
    pub const fn rejection(&self) -> Option<&Rejection> {
        match &self.status {
            CommandStatus::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}
