pub mod invariants;
pub mod playability;
pub mod policy;
pub mod reports;
pub mod runner;
pub mod seeds;

pub use playability::{PlayabilityAggregate, aggregate_playability};
pub use policy::{GameplayStrategy, Loadout, Observation, PlayerPolicy, PolicyDecision};
pub use runner::{DEFAULT_MAX_COMMANDS, PlaythroughRunner, RunOutcome, RunRecord};
pub use seeds::{iteration_seed, resolve_seed_inputs, split_csv};
