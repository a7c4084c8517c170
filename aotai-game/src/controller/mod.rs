//! Phase state machine: commands, phases, the pure reducer and the session that drives it.
pub mod command;
pub mod phase;
pub mod reducer;
pub mod session;

pub use command::{Command, CommandResult, CommandStatus};
pub use phase::{EventReport, Phase, ReportLine, WarningReason, WarningReasons, warning_reasons};
pub use reducer::{Context, Documents, Persist, SessionState, Transition, reduce};
pub use session::{GameSession, SAVE_SLOT};
