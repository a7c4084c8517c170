#![allow(clippy::field_reassign_with_default)]
use aotai_game::controller::{Context, Documents, SessionState, reduce};
use aotai_game::store::{projected_load, update_cart};
use aotai_game::weather::reweighted_row;
use aotai_game::{
    ActionPhase, Cart, Catalogs, Command, Ending, EventContext, GameState, ItemCatalog, Phase,
    Rejection, RngBundle, Season, StatTarget, Weather, check_event, next_weather,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn stat_target() -> impl Strategy<Value = StatTarget> {
    prop_oneof![
        Just(StatTarget::Stamina),
        Just(StatTarget::Hunger),
        Just(StatTarget::Thirst),
        Just(StatTarget::Sanity),
        Just(StatTarget::Health),
        Just(StatTarget::BodyTemperature),
    ]
}

const CART_ITEMS: [&str; 4] = ["water_bottle", "stove", "pack_60l", "anvil"];

fn cart_catalog() -> ItemCatalog {
    ItemCatalog::from_json(
        r#"[
        {"id": "water_bottle", "name": "Water", "weight": 1.0, "price": 10, "type": "drink",
         "effects": {"thirst": 30}},
        {"id": "stove", "name": "Stove", "weight": 0.5, "price": 120, "type": "tool",
         "effects": {"can_cook": true}},
        {"id": "pack_60l", "name": "60L Pack", "weight": 2.0, "price": 300, "type": "container",
         "effects": {"capacity_bonus": 15}},
        {"id": "anvil", "name": "Anvil", "weight": 9.0, "price": 1, "type": "gear"}
    ]"#,
    )
    .unwrap()
}

proptest! {
    #[test]
    fn cart_stays_within_money_and_capacity(
        money in 0i64..2_500,
        steps in prop::collection::vec((0usize..4, -5i32..6, 0u32..12), 1..60),
    ) {
        let items = cart_catalog();
        let mut state = GameState::default();
        state.money = money;
        let mut cart = Cart::new();
        for (index, delta, multiplier) in steps {
            let before = cart.clone();
            let outcome = update_cart(&state, &mut cart, &items, CART_ITEMS[index], delta, multiplier);
            if outcome.is_err() {
                prop_assert_eq!(&cart, &before);
            }
            prop_assert!(cart.total_cost(&items) <= state.money);
            let (weight, capacity) = projected_load(&state, &cart, &items);
            prop_assert!(weight <= capacity, "{} kg in a {} kg pack", weight, capacity);
        }
    }

    #[test]
    fn stats_stay_in_range_after_any_adjustment(
        deltas in prop::collection::vec((stat_target(), -500.0f64..500.0), 1..40),
        cap in 1.0f64..100.0,
    ) {
        let mut state = GameState::default();
        state.apply_stamina_cap(cap);
        for (target, delta) in deltas {
            state.stats.adjust(target, delta);
            state.clamp();
            let stats = state.stats;
            prop_assert!((0.0..=state.stamina_cap).contains(&stats.stamina));
            for value in [stats.hunger, stats.thirst, stats.sanity, stats.health] {
                prop_assert!((0.0..=100.0).contains(&value));
            }
            prop_assert!((30.0..=42.0).contains(&stats.temperature));
        }
    }

    #[test]
    fn weather_rows_are_distributions(season_index in 0usize..4, weather_index in 0usize..6) {
        let row = reweighted_row(Weather::ALL[weather_index], Season::ALL[season_index]);
        let total: f64 = row.iter().map(|(_, weight)| weight).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }
}

#[test]
fn weather_chain_replays_for_a_seed() {
    let chain = |seed: u64| {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut current = Weather::Sunny;
        (0..50)
            .map(|_| {
                current = next_weather(current, Season::Winter, &mut rng);
                current
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(chain(17), chain(17));
}

#[test]
fn event_draws_replay_and_unique_events_never_return() {
    let catalogs = Catalogs::default_catalogs();
    let mut state = GameState::default();
    state.current_node_id = "camp_2800".into();
    state.day_time = 12;
    let roll = |state: &GameState, seed: u64| {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..40)
            .map(|_| {
                check_event(
                    state,
                    &catalogs.map,
                    &catalogs.events,
                    EventContext::for_phase(ActionPhase::Rest),
                    &mut rng,
                )
                .map(|event| event.id.clone())
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(roll(&state, 3), roll(&state, 3));
    assert!(roll(&state, 3).iter().flatten().any(|id| id == "fellow_hikers"));

    state.triggered_events.insert("fellow_hikers".into());
    for seed in 0..20 {
        assert!(
            roll(&state, seed)
                .iter()
                .flatten()
                .all(|id| id != "fellow_hikers")
        );
    }
}

#[test]
fn health_and_sanity_at_zero_is_death() {
    let catalogs = Catalogs::default_catalogs();
    let mut state = GameState::default();
    state.stats.health = 0.0;
    state.stats.sanity = 0.0;
    assert_eq!(state.check_game_over(&catalogs.map), Some(Ending::Death));
}

#[test]
fn checkout_over_budget_changes_nothing() {
    let catalogs = Catalogs::default_catalogs();
    let mut session = SessionState::default();
    session.phase = Phase::Shop;
    session.state.money = 100;
    session.cart.set("pot", 1);
    session.cart.set("medicine", 1);
    let rng = RngBundle::from_user_seed(1);
    let documents = Documents::default();
    let transition = reduce(
        &session,
        &Command::Checkout,
        Context {
            catalogs: &catalogs,
            rng: &rng,
            documents: &documents,
        },
    );
    assert_eq!(
        transition.result.rejection(),
        Some(&Rejection::InsufficientFunds {
            cost: 120,
            money: 100
        })
    );
    assert_eq!(transition.next, session);
    assert!(transition.persist.is_none());
}

#[test]
fn action_points_refill_once_per_rollover() {
    let mut state = GameState::default();
    state.action_points = 0;
    state.update_time(10);
    assert_eq!(state.action_points, 0);
    state.update_time(6);
    assert_eq!(state.action_points, 10);
    state.action_points = 3;
    state.update_time(12);
    assert_eq!(state.action_points, 3);
    assert_eq!(state.game_time, 1);
}
