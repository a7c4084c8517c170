use serde::Serialize;
use thiserror::Error;

/// Reasons a command is refused before any state changes.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("`{command}` is not available during {phase}")]
    WrongPhase {
        command: &'static str,
        phase: &'static str,
    },
    #[error("unknown item `{0}`")]
    UnknownItem(String),
    #[error("unknown node `{0}`")]
    UnknownNode(String),
    #[error("unknown character `{0}`")]
    UnknownCharacter(String),
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    #[error("no action points left today")]
    NoActionPoints,
    #[error("too exhausted to keep hiking")]
    Exhausted,
    #[error("already at the next waypoint")]
    NoDistanceRemaining,
    #[error("still {remaining:.1} km from the next waypoint")]
    NotAtWaypoint { remaining: f64 },
    #[error("`{to}` cannot be reached from `{from}`")]
    NotConnected { from: String, to: String },
    #[error("this waypoint is not the end of the route")]
    NotTerminal,
    #[error("camping needs a tent")]
    NoShelter,
    #[error("there is no clean snow within reach, or you are not thirsty enough")]
    CannotEatSnow,
    #[error("you are not carrying `{0}`")]
    ItemNotHeld(String),
    #[error("`{0}` cannot be eaten or used")]
    NotConsumable(String),
    #[error("costs {cost} but only {money} is available")]
    InsufficientFunds { cost: i64, money: i64 },
    #[error("pack would weigh {weight:.1} kg, capacity is {capacity:.1} kg")]
    OverCapacity { weight: f64, capacity: f64 },
    #[error("choice {0} does not exist")]
    InvalidChoice(usize),
    #[error("requires {0}")]
    RequirementUnmet(String),
    #[error("the special ability is not available")]
    AbilityUnavailable,
}

/// Save and cart documents could not be written or read back.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("document could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}
