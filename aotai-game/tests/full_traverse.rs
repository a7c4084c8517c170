use aotai_game::{
    Catalogs, Command, CommandStatus, GameSession, GameState, MemoryStorage, Phase, RngBundle,
    Season, result_summary,
};

const MAX_COMMANDS: usize = 3_000;

fn new_session(seed: u64) -> GameSession<MemoryStorage> {
    GameSession::new(
        Catalogs::default_catalogs(),
        RngBundle::from_user_seed(seed),
        MemoryStorage::new(),
    )
}

fn assert_in_range(state: &GameState) {
    let stats = &state.stats;
    for (name, value) in [
        ("stamina", stats.stamina),
        ("hunger", stats.hunger),
        ("thirst", stats.thirst),
        ("sanity", stats.sanity),
        ("health", stats.health),
    ] {
        assert!((0.0..=100.0).contains(&value), "{name} out of range: {value}");
    }
    assert!((30.0..=42.0).contains(&stats.temperature));
    assert!(state.distance_to_next_node >= 0.0);
    assert!(state.money >= 0);
    assert!(state.inventory.values().all(|count| *count > 0));
    assert!(state.equipment.iter().all(|id| state.inventory.contains_key(id)));
}

fn outfit(session: &mut GameSession<MemoryStorage>) {
    for (item_id, delta) in [
        ("tent", 1),
        ("sleeping_bag", 1),
        ("jacket_windbreaker", 1),
        ("backpack_large", 1),
        ("water_bottle", 6),
        ("food_naan", 6),
        ("food_high_energy", 6),
        ("food_beef_jerky", 4),
    ] {
        let result = session.dispatch(Command::AdjustCart {
            item_id: item_id.into(),
            delta,
            multiplier: 1,
        });
        assert!(result.is_applied(), "{item_id}: {}", result.message);
    }
    let result = session.dispatch(Command::Checkout);
    assert!(result.is_applied(), "{}", result.message);
}

fn pick_supply(state: &GameState, options: &[&'static str]) -> Option<&'static str> {
    options.iter().copied().find(|id| state.has_item(id))
}

/// One sensible command for the current phase.
fn next_command(session: &GameSession<MemoryStorage>, last_rejected: bool) -> Command {
    let state = session.state();
    match session.phase() {
        Phase::Warning { .. } => Command::ConfirmWarning { proceed: true },
        Phase::CookingChoice { .. } => Command::CookingChoice { cook: true },
        Phase::EatSnowConfirm => Command::EatSnow { confirm: true },
        Phase::RetreatConfirm => Command::Retreat { confirm: false },
        Phase::EventResult { .. } => Command::AcknowledgeEventResult,
        Phase::Event { event_id } => {
            let event = session
                .catalogs()
                .events
                .get(event_id)
                .expect("active event is in the catalog");
            let index = event
                .choices
                .iter()
                .position(|choice| {
                    choice.requirements_met(state) && choice.special_action().is_none()
                })
                .unwrap_or(0);
            Command::ChooseEventOption { index }
        }
        Phase::Explore => explore_command(session, last_rejected),
        other => panic!("unexpected phase {other}"),
    }
}

fn explore_command(session: &GameSession<MemoryStorage>, last_rejected: bool) -> Command {
    let state = session.state();
    let stats = &state.stats;
    if stats.thirst < 50.0
        && !last_rejected
        && let Some(item_id) = pick_supply(state, &["water_bottle"])
    {
        return Command::UseItem {
            item_id: item_id.into(),
        };
    }
    if stats.hunger < 50.0
        && !last_rejected
        && let Some(item_id) = pick_supply(state, &["food_naan", "food_beef_jerky", "food_high_energy"])
    {
        return Command::UseItem {
            item_id: item_id.into(),
        };
    }
    if state.distance_to_next_node <= 0.0 {
        let map = &session.catalogs().map;
        return match map.connections(&state.current_node_id).next() {
            Some(next) => Command::TravelTo {
                node_id: next.id.clone(),
            },
            None => Command::Finish,
        };
    }
    if state.action_points == 0 || (stats.stamina < 30.0 && last_rejected) {
        return Command::Camp;
    }
    if stats.stamina < 30.0 {
        return Command::Rest;
    }
    Command::Hike
}

fn play(seed: u64) -> GameSession<MemoryStorage> {
    let mut session = new_session(seed);
    assert!(session.dispatch(Command::NewGame).is_applied());
    assert!(
        session
            .dispatch(Command::SelectCharacter {
                id: "veteran".into()
            })
            .is_applied()
    );
    assert!(
        session
            .dispatch(Command::SelectSeason {
                season: Season::Summer
            })
            .is_applied()
    );
    assert!(session.dispatch(Command::ConfirmSetup).is_applied());
    assert_eq!(*session.phase(), Phase::Shop);
    outfit(&mut session);
    assert_eq!(*session.phase(), Phase::Explore);

    let mut last_rejected = false;
    for _ in 0..MAX_COMMANDS {
        if *session.phase() == Phase::GameOver {
            return session;
        }
        let command = next_command(&session, last_rejected);
        let before = session.snapshot().clone();
        let result = session.dispatch(command);
        assert_in_range(session.state());
        match result.status {
            CommandStatus::Rejected(_) => {
                assert_eq!(session.snapshot(), &before, "rejection mutated state");
                last_rejected = true;
            }
            CommandStatus::Failed(reason) => panic!("unexpected failure: {reason}"),
            CommandStatus::Applied => last_rejected = false,
        }
    }
    panic!("run did not finish within {MAX_COMMANDS} commands");
}

#[test]
fn scripted_traverse_reaches_game_over() {
    let session = play(0xA07A1);
    let state = session.state();
    let ending = state.ending.expect("finished run records an ending");
    let summary = result_summary(state).expect("summary after game over");
    assert_eq!(summary.ending, ending);
    assert_eq!(summary.days_survived, state.game_time);
    assert!(summary.max_altitude >= 1_740.0);
    assert!((30.0..=42.0).contains(&summary.lowest_temp));
}

#[test]
fn same_seed_replays_the_same_traverse() {
    let first = play(42).into_state();
    let second = play(42).into_state();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn game_over_only_accepts_new_game_or_menu() {
    let mut session = play(7);
    let before = session.snapshot().clone();
    let result = session.dispatch(Command::Hike);
    assert!(result.rejection().is_some());
    assert_eq!(session.snapshot(), &before);
    assert!(session.dispatch(Command::NewGame).is_applied());
    assert_eq!(*session.phase(), Phase::Setup);
    assert!(session.state().ending.is_none());
}

#[test]
fn retreat_at_the_checkpoint_ends_the_run_as_survived() {
    let mut session = new_session(3);
    session.dispatch(Command::NewGame);
    session.dispatch(Command::ConfirmSetup);
    outfit(&mut session);

    let mut last_rejected = false;
    for _ in 0..MAX_COMMANDS {
        match session.phase() {
            Phase::RetreatConfirm => {
                let result = session.dispatch(Command::Retreat { confirm: true });
                assert!(result.is_applied());
                assert_eq!(*session.phase(), Phase::GameOver);
                let ending = session.state().ending.expect("ending recorded");
                assert!(ending.is_win());
                assert_eq!(session.state().current_node_id, "camp_2800");
                return;
            }
            Phase::GameOver => panic!("run ended before the retreat checkpoint"),
            _ => {}
        }
        let command = next_command(&session, last_rejected);
        last_rejected = session.dispatch(command).rejection().is_some();
    }
    panic!("never reached the retreat checkpoint");
}
