use colored::Colorize;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use aotai_game::{
    Catalogs, Command, CommandResult, Ending, GameSession, MemoryStorage, Phase, Rank, Rejection,
    RngBundle, result_summary,
};

use super::invariants::{check_state, check_transition};
use super::policy::{GameplayStrategy, Observation, PlayerPolicy};

pub const DEFAULT_MAX_COMMANDS: usize = 4_000;
/// Consecutive rejections after which a run is considered stuck.
const STALL_LIMIT: usize = 50;
const RECENT_DECISIONS: usize = 5;

/// One command a policy issued and how the engine answered.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub day: u32,
    pub hour: u32,
    pub phase: &'static str,
    pub command: &'static str,
    pub key: &'static str,
    pub rationale: Option<String>,
}

/// How a playthrough stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "ending")]
pub enum RunOutcome {
    Ended(Ending),
    /// Too many rejections in a row.
    Stalled,
    /// Hit the command cap before the run ended.
    CommandCap,
}

impl RunOutcome {
    #[must_use]
    pub const fn ending(self) -> Option<Ending> {
        match self {
            Self::Ended(ending) => Some(ending),
            Self::Stalled | Self::CommandCap => None,
        }
    }

    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Ended(ending) => ending.to_string(),
            Self::Stalled => "stalled".to_string(),
            Self::CommandCap => "command_cap".to_string(),
        }
    }
}

/// Everything measured for one seeded playthrough.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub strategy: GameplayStrategy,
    pub seed: u64,
    pub outcome: RunOutcome,
    pub rank: Option<Rank>,
    pub days_survived: u32,
    pub distance_km: f64,
    pub lowest_temp: f64,
    pub lowest_sanity: f64,
    pub max_altitude: f64,
    pub money_left: i64,
    pub commands: usize,
    pub rejections: usize,
    pub events_seen: usize,
    pub rng_draws: u64,
    pub violations: Vec<String>,
    pub recent_decisions: Vec<DecisionRecord>,
    #[serde(serialize_with = "duration_millis")]
    pub duration: Duration,
    /// Serialized final session, compared by the replay check.
    #[serde(skip)]
    pub fingerprint: String,
}

impl RunRecord {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn survived(&self) -> bool {
        self.outcome.ending().is_some_and(Ending::is_win)
    }
}

fn duration_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    duration.as_millis().serialize(serializer)
}

/// Counters and findings gathered while a run is in progress.
#[derive(Debug, Default)]
struct RunTracker {
    commands: usize,
    rejections: usize,
    events_seen: usize,
    violations: Vec<String>,
    recent: VecDeque<DecisionRecord>,
}

impl RunTracker {
    fn step(
        &mut self,
        session: &mut GameSession<MemoryStorage>,
        command: Command,
        rationale: Option<String>,
    ) -> CommandResult {
        let before = session.snapshot().clone();
        let result = session.dispatch(command.clone());
        self.commands += 1;
        if result.rejection().is_some() {
            self.rejections += 1;
        }
        if matches!(result.phase, Phase::Event { .. }) && !matches!(before.phase, Phase::Event { .. })
        {
            self.events_seen += 1;
        }

        let after = session.snapshot();
        let mut found = check_transition(&before, after, &command, &result);
        found.extend(check_state(&after.state, &after.phase, session.catalogs()));
        for violation in found {
            self.violations.push(format!(
                "command #{} on day {}: {violation}",
                self.commands, after.state.game_time
            ));
        }

        if self.recent.len() == RECENT_DECISIONS {
            self.recent.pop_front();
        }
        self.recent.push_back(DecisionRecord {
            day: before.state.game_time,
            hour: before.state.day_time,
            phase: before.phase.name(),
            command: command.name(),
            key: result.key,
            rationale,
        });
        result
    }
}

/// Plays complete runs against an in-memory session.
#[derive(Debug, Clone)]
pub struct PlaythroughRunner {
    catalogs: Catalogs,
    max_commands: usize,
    verbose: bool,
}

impl PlaythroughRunner {
    #[must_use]
    pub const fn new(catalogs: Catalogs, max_commands: usize, verbose: bool) -> Self {
        Self {
            catalogs,
            max_commands,
            verbose,
        }
    }

    #[must_use]
    pub const fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    /// Run `strategy` on `seed`, then replay it and flag any divergence.
    #[must_use]
    pub fn run_checked(&self, strategy: GameplayStrategy, seed: u64) -> RunRecord {
        let mut record = self.run(strategy, seed);
        let replay = self.run(strategy, seed);
        if replay.fingerprint != record.fingerprint || replay.commands != record.commands {
            record.violations.push(format!(
                "seed {seed} did not replay: {} commands then {}",
                record.commands, replay.commands
            ));
        }
        record
    }

    /// Play one run from the menu until it ends, stalls or hits the command cap.
    #[must_use]
    pub fn run(&self, strategy: GameplayStrategy, seed: u64) -> RunRecord {
        let start = Instant::now();
        let mut session = GameSession::new(
            self.catalogs.clone(),
            RngBundle::from_user_seed(seed),
            MemoryStorage::new(),
        );
        let mut policy = strategy.create_policy(seed);
        let mut tracker = RunTracker::default();
        Self::setup(&mut session, policy.as_ref(), &mut tracker);

        let mut last_rejection: Option<Rejection> = None;
        let mut streak = 0;
        let outcome = loop {
            if let Some(ending) = session.state().ending
                && *session.phase() == Phase::GameOver
            {
                break RunOutcome::Ended(ending);
            }
            if streak >= STALL_LIMIT {
                break RunOutcome::Stalled;
            }
            if tracker.commands >= self.max_commands {
                break RunOutcome::CommandCap;
            }
            let decision = policy.decide(&Observation {
                state: session.state(),
                phase: session.phase(),
                catalogs: session.catalogs(),
                last_rejection: last_rejection.as_ref(),
            });
            let result = tracker.step(&mut session, decision.command, decision.rationale);
            last_rejection = result.rejection().cloned();
            streak = if last_rejection.is_some() { streak + 1 } else { 0 };
        };

        // Scripted players must finish; the fuzzer is only held to the invariants.
        if strategy != GameplayStrategy::Random && outcome.ending().is_none() {
            tracker.violations.push(format!(
                "{} run did not finish ({}) after {} commands",
                policy.name(),
                outcome.label(),
                tracker.commands
            ));
        }

        let state = session.state();
        let summary = result_summary(state);
        let fingerprint = serde_json::to_string(session.snapshot()).unwrap_or_default();
        let record = RunRecord {
            strategy,
            seed,
            outcome,
            rank: summary.as_ref().map(|s| s.rank),
            days_survived: state.statistics.days_survived,
            distance_km: state.total_distance,
            lowest_temp: state.statistics.lowest_temp,
            lowest_sanity: state.statistics.lowest_sanity,
            max_altitude: state.statistics.max_altitude,
            money_left: state.money,
            commands: tracker.commands,
            rejections: tracker.rejections,
            events_seen: tracker.events_seen,
            rng_draws: session.rng().total_draws(),
            violations: tracker.violations,
            recent_decisions: tracker.recent.into_iter().collect(),
            duration: start.elapsed(),
            fingerprint,
        };
        if self.verbose {
            announce(&record);
        }
        log::debug!(
            "{} seed {} finished: {} after {} commands",
            strategy,
            seed,
            record.outcome.label(),
            record.commands
        );
        record
    }

    fn setup(
        session: &mut GameSession<MemoryStorage>,
        policy: &dyn PlayerPolicy,
        tracker: &mut RunTracker,
    ) {
        let loadout = policy.loadout();
        tracker.step(session, Command::NewGame, None);
        tracker.step(
            session,
            Command::SelectCharacter {
                id: loadout.character.to_string(),
            },
            None,
        );
        tracker.step(
            session,
            Command::SelectSeason {
                season: loadout.season,
            },
            None,
        );
        tracker.step(session, Command::ConfirmSetup, None);
        tracker.step(session, Command::ClearCart, None);
        for (item_id, delta) in loadout.purchases {
            tracker.step(
                session,
                Command::AdjustCart {
                    item_id: (*item_id).to_string(),
                    delta: *delta,
                    multiplier: 1,
                },
                Some("loadout".to_string()),
            );
        }
        let checkout = tracker.step(session, Command::Checkout, None);
        if !checkout.is_applied() {
            log::warn!("{} loadout refused: {}", policy.name(), checkout.message);
            tracker.step(session, Command::ClearCart, None);
            tracker.step(session, Command::Checkout, Some("empty pack".to_string()));
        }
    }
}

fn announce(record: &RunRecord) {
    let status = if record.passed() { "✅" } else { "❌" };
    let outcome = if record.survived() {
        record.outcome.label().green()
    } else {
        record.outcome.label().yellow()
    };
    println!(
        "  {status} {} seed {} -> {} | days {} | {:.1} km | {} commands ({} rejected) | {:?}",
        record.strategy.label().bright_white(),
        record.seed,
        outcome,
        record.days_survived,
        record.distance_km,
        record.commands,
        record.rejections,
        record.duration
    );
    for violation in &record.violations {
        println!("     • {}", violation.red());
    }
    if !record.passed() {
        for decision in &record.recent_decisions {
            println!(
                "     ↳ day {} {:02}:00 [{}] {} -> {}",
                decision.day, decision.hour, decision.phase, decision.command, decision.key
            );
        }
    }
}
