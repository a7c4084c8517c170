//! Checks applied after every dispatched command.
use aotai_game::constants::{
    DAILY_ACTION_POINTS, MAX_BODY_TEMP, MAX_HEALTH, MAX_HUNGER, MAX_SANITY, MAX_THIRST,
    MIN_BODY_TEMP,
};
use aotai_game::{Catalogs, Command, CommandResult, CommandStatus, GameState, Phase, SessionState};

const EPSILON: f64 = 1e-9;

/// Invariants every reachable state must satisfy.
#[must_use]
pub fn check_state(state: &GameState, phase: &Phase, catalogs: &Catalogs) -> Vec<String> {
    let mut violations = Vec::new();
    let stats = &state.stats;
    for (name, value, max) in [
        ("stamina", stats.stamina, state.stamina_cap),
        ("hunger", stats.hunger, MAX_HUNGER),
        ("thirst", stats.thirst, MAX_THIRST),
        ("sanity", stats.sanity, MAX_SANITY),
        ("health", stats.health, MAX_HEALTH),
    ] {
        if !(0.0..=max + EPSILON).contains(&value) {
            violations.push(format!("{name} {value:.2} outside 0..={max}"));
        }
    }
    if !(MIN_BODY_TEMP..=MAX_BODY_TEMP).contains(&stats.temperature) {
        violations.push(format!("body temperature {:.2} out of range", stats.temperature));
    }
    if state.money < 0 {
        violations.push(format!("money went negative: {}", state.money));
    }
    if state.distance_to_next_node < 0.0 {
        violations.push(format!(
            "negative distance to next node: {:.2}",
            state.distance_to_next_node
        ));
    }
    if !(0..=DAILY_ACTION_POINTS).contains(&state.action_points) {
        violations.push(format!("action points {} out of range", state.action_points));
    }
    if let Some((id, _)) = state.inventory.iter().find(|(_, count)| **count == 0) {
        violations.push(format!("inventory keeps a zero count for `{id}`"));
    }
    if let Some(id) = state
        .equipment
        .iter()
        .find(|id| !state.inventory.contains_key(*id))
    {
        violations.push(format!("`{id}` equipped but not carried"));
    }

    let in_play = phase == &Phase::Explore || phase.is_modal();
    if in_play {
        if state.ending.is_some() {
            violations.push(format!("ending recorded while still in {phase}"));
        }
        if !catalogs.map.is_empty() && catalogs.map.get(&state.current_node_id).is_none() {
            violations.push(format!("standing on unknown node `{}`", state.current_node_id));
        }
    }
    if phase == &Phase::GameOver && state.ending.is_none() {
        violations.push("game over without an ending".to_string());
    }
    violations
}

/// Invariants relating the snapshots on either side of one command.
#[must_use]
pub fn check_transition(
    before: &SessionState,
    after: &SessionState,
    command: &Command,
    result: &CommandResult,
) -> Vec<String> {
    let mut violations = Vec::new();
    let name = command.name();

    if result.phase != after.phase {
        violations.push(format!(
            "{name}: result reports {} but session is in {}",
            result.phase, after.phase
        ));
    }
    match &result.status {
        CommandStatus::Rejected(reason) if before != after => {
            violations.push(format!("{name}: rejected ({reason}) but state changed"));
        }
        CommandStatus::Failed(message) if before != after => {
            violations.push(format!("{name}: failed ({message}) but state changed"));
        }
        _ => {}
    }

    // A new game or a load legitimately replaces the whole state.
    if matches!(command, Command::NewGame | Command::Load) {
        return violations;
    }
    let (old, new) = (&before.state, &after.state);
    if new.game_time < old.game_time
        || (new.game_time == old.game_time && new.day_time < old.day_time)
    {
        violations.push(format!("{name}: clock ran backwards"));
    }
    if !new.triggered_events.is_superset(&old.triggered_events) {
        violations.push(format!("{name}: forgot a triggered unique event"));
    }
    if old.teleport_used && !new.teleport_used {
        violations.push(format!("{name}: teleport became available again"));
    }
    if new.action_points > old.action_points && new.game_time == old.game_time {
        violations.push(format!(
            "{name}: action points rose from {} to {} without a new day",
            old.action_points, new.action_points
        ));
    }
    if old.ending.is_some() && new.ending != old.ending && !matches!(command, Command::ReturnToMenu)
    {
        violations.push(format!("{name}: ending changed after the run was over"));
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use aotai_game::Rejection;

    fn result(phase: Phase, status: CommandStatus) -> CommandResult {
        CommandResult {
            key: "test",
            message: String::new(),
            phase,
            status,
        }
    }

    #[test]
    fn default_explore_state_is_clean() {
        let catalogs = Catalogs::default_catalogs();
        let state = GameState::default();
        assert!(check_state(&state, &Phase::Explore, &catalogs).is_empty());
    }

    #[test]
    fn out_of_range_stats_are_reported() {
        let catalogs = Catalogs::default_catalogs();
        let mut state = GameState::default();
        state.stats.health = -1.0;
        state.stats.temperature = 29.0;
        state.money = -5;
        let violations = check_state(&state, &Phase::Explore, &catalogs);
        assert_eq!(violations.len(), 3, "{violations:?}");
    }

    #[test]
    fn rejection_that_changes_state_is_flagged() {
        let before = SessionState {
            phase: Phase::Explore,
            ..SessionState::default()
        };
        let mut after = before.clone();
        after.state.money -= 1;
        let violations = check_transition(
            &before,
            &after,
            &Command::Hike,
            &result(
                Phase::Explore,
                CommandStatus::Rejected(Rejection::NoActionPoints),
            ),
        );
        assert_eq!(violations.len(), 1, "{violations:?}");
    }

    #[test]
    fn action_points_may_only_refill_on_a_new_day() {
        let mut before = SessionState {
            phase: Phase::Explore,
            ..SessionState::default()
        };
        before.state.action_points = 2;
        let mut after = before.clone();
        after.state.action_points = DAILY_ACTION_POINTS;
        let applied = result(Phase::Explore, CommandStatus::Applied);
        assert_eq!(
            check_transition(&before, &after, &Command::Rest, &applied).len(),
            1
        );
        after.state.game_time += 1;
        assert!(check_transition(&before, &after, &Command::Rest, &applied).is_empty());
        assert!(check_transition(&before, &after, &Command::Load, &applied).is_empty());
    }
}
