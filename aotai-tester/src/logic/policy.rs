use std::fmt;
use std::str::FromStr;

use aotai_game::{
    Catalogs, Command, EventDefinition, GameState, MapNode, Phase, Rejection, Season, Terrain,
    WarningReason,
};
use aotai_game::events::SpecialAction;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

const WATER: &[&str] = &["water_bottle"];
const FOOD: &[&str] = &[
    "food_naan",
    "food_steamed_bun",
    "food_beef_jerky",
    "food_high_energy",
    "food_dried_noodles",
    "food_instant_noodles",
    "food_apple",
    "candy",
];
const HEALING: &[&str] = &["first_aid_kit", "medicine"];
const WARMING: &[&str] = &["hand_warmer", "liquor"];

/// Character, season and shopping list a policy starts a run with.
#[derive(Debug, Clone, Serialize)]
pub struct Loadout {
    pub character: &'static str,
    pub season: Season,
    pub purchases: &'static [(&'static str, i32)],
}

/// What the policy can see before deciding.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub state: &'a GameState,
    pub phase: &'a Phase,
    pub catalogs: &'a Catalogs,
    /// Rejection returned for the previous command, if any.
    pub last_rejection: Option<&'a Rejection>,
}

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub command: Command,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(command: Command, rationale: impl Into<String>) -> Self {
        Self {
            command,
            rationale: Some(rationale.into()),
        }
    }

    #[must_use]
    pub const fn plain(command: Command) -> Self {
        Self {
            command,
            rationale: None,
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Setup and shopping plan for a new run.
    fn loadout(&self) -> Loadout;

    /// Pick the next command while exploring or answering a prompt.
    fn decide(&mut self, view: &Observation<'_>) -> PolicyDecision;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameplayStrategy {
    Cautious,
    Balanced,
    Reckless,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 4] = [Self::Cautious, Self::Balanced, Self::Reckless, Self::Random];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cautious => "Cautious",
            Self::Balanced => "Balanced",
            Self::Reckless => "Reckless",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Cautious => Box::new(ThresholdPolicy::cautious()),
            Self::Balanced => Box::new(ThresholdPolicy::balanced()),
            Self::Reckless => Box::new(ThresholdPolicy::reckless()),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }

    /// Parse a comma separated list; `all` expands to every strategy.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unknown strategy.
    pub fn parse_list(tokens: &[String]) -> anyhow::Result<Vec<Self>> {
        let mut strategies = Vec::new();
        for token in tokens {
            if token.eq_ignore_ascii_case("all") {
                strategies.extend(Self::ALL);
            } else {
                strategies.push(token.parse()?);
            }
        }
        strategies.sort();
        strategies.dedup();
        if strategies.is_empty() {
            strategies.extend(Self::ALL);
        }
        Ok(strategies)
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameplayStrategy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cautious" => Ok(Self::Cautious),
            "balanced" => Ok(Self::Balanced),
            "reckless" => Ok(Self::Reckless),
            "random" => Ok(Self::Random),
            other => anyhow::bail!("unknown strategy `{other}`"),
        }
    }
}

fn first_held(state: &GameState, options: &[&'static str]) -> Option<&'static str> {
    options.iter().copied().find(|id| state.has_item(id))
}

fn use_item(item_id: &str, why: &str) -> PolicyDecision {
    PolicyDecision::new(
        Command::UseItem {
            item_id: item_id.to_string(),
        },
        why,
    )
}

fn has_cooking_kit(state: &GameState) -> bool {
    ["stove", "pot", "gas"].iter().all(|id| state.has_item(id))
}

/// Tunables shared by the scripted strategies.
#[derive(Debug, Clone, Copy)]
struct Thresholds {
    drink_below: f64,
    eat_below: f64,
    heal_below: f64,
    warm_below: f64,
    rest_below: f64,
    retreat_below_health: f64,
    camp_at_night: bool,
    push_through_warnings: bool,
    avoid_danger: bool,
    scavenge: bool,
}

/// Rule-based player: keeps stats above thresholds, otherwise hikes.
struct ThresholdPolicy {
    name: &'static str,
    thresholds: Thresholds,
    loadout: Loadout,
    declined_warning: bool,
}

impl ThresholdPolicy {
    fn cautious() -> Self {
        Self {
            name: "Cautious",
            thresholds: Thresholds {
                drink_below: 60.0,
                eat_below: 60.0,
                heal_below: 50.0,
                warm_below: 35.5,
                rest_below: 45.0,
                retreat_below_health: 70.0,
                camp_at_night: true,
                push_through_warnings: false,
                avoid_danger: true,
                scavenge: false,
            },
            loadout: Loadout {
                character: "veteran",
                season: Season::Summer,
                purchases: &[
                    ("tent", 1),
                    ("sleeping_bag", 1),
                    ("jacket_windbreaker", 1),
                    ("backpack_large", 1),
                    ("water_bottle", 6),
                    ("food_naan", 8),
                    ("food_high_energy", 4),
                    ("first_aid_kit", 1),
                    ("hand_warmer", 2),
                ],
            },
            declined_warning: false,
        }
    }

    fn balanced() -> Self {
        Self {
            name: "Balanced",
            thresholds: Thresholds {
                drink_below: 50.0,
                eat_below: 50.0,
                heal_below: 35.0,
                warm_below: 35.0,
                rest_below: 30.0,
                retreat_below_health: 40.0,
                camp_at_night: false,
                push_through_warnings: false,
                avoid_danger: true,
                scavenge: true,
            },
            loadout: Loadout {
                character: "athlete",
                season: Season::Autumn,
                purchases: &[
                    ("tent", 1),
                    ("sleeping_bag", 1),
                    ("jacket_windbreaker", 1),
                    ("backpack_large", 1),
                    ("water_bottle", 6),
                    ("food_naan", 6),
                    ("food_beef_jerky", 4),
                    ("medicine", 2),
                ],
            },
            declined_warning: false,
        }
    }

    fn reckless() -> Self {
        Self {
            name: "Reckless",
            thresholds: Thresholds {
                drink_below: 25.0,
                eat_below: 25.0,
                heal_below: 15.0,
                warm_below: 33.0,
                rest_below: 15.0,
                retreat_below_health: 0.0,
                camp_at_night: false,
                push_through_warnings: true,
                avoid_danger: false,
                scavenge: true,
            },
            loadout: Loadout {
                character: "student",
                season: Season::Winter,
                purchases: &[
                    ("tent", 1),
                    ("backpack_small", 1),
                    ("water_bottle", 4),
                    ("food_dried_noodles", 4),
                    ("food_instant_noodles", 4),
                    ("candy", 4),
                ],
            },
            declined_warning: false,
        }
    }

    fn explore(&mut self, view: &Observation<'_>) -> PolicyDecision {
        let state = view.state;
        let stats = &state.stats;
        let t = self.thresholds;
        let retrying = view.last_rejection.is_some();

        if !retrying {
            if stats.thirst < t.drink_below {
                if let Some(id) = first_held(state, WATER) {
                    return use_item(id, "thirsty");
                }
                if stats.thirst <= 30.0 {
                    return PolicyDecision::new(Command::RequestEatSnow, "out of water");
                }
            }
            if stats.hunger < t.eat_below
                && let Some(id) = first_held(state, FOOD)
            {
                return use_item(id, "hungry");
            }
            if stats.health < t.heal_below
                && let Some(id) = first_held(state, HEALING)
            {
                return use_item(id, "hurt");
            }
            if stats.temperature < t.warm_below
                && let Some(id) = first_held(state, WARMING)
            {
                return use_item(id, "cold");
            }
        }

        if state.distance_to_next_node <= 0.0 {
            return self.at_waypoint(view);
        }
        if state.action_points <= 0 {
            return PolicyDecision::new(Command::Camp, "out of action points");
        }
        if t.camp_at_night && state.is_night() && !retrying {
            return PolicyDecision::new(Command::Camp, "night");
        }
        let exhausted = matches!(view.last_rejection, Some(Rejection::Exhausted));
        if exhausted || self.declined_warning || stats.stamina < t.rest_below {
            self.declined_warning = false;
            return PolicyDecision::new(Command::Rest, "recovering stamina");
        }
        PolicyDecision::plain(Command::Hike)
    }

    fn at_waypoint(&self, view: &Observation<'_>) -> PolicyDecision {
        let state = view.state;
        let map = &view.catalogs.map;
        let mut options: Vec<&MapNode> = map.connections(&state.current_node_id).collect();
        if options.is_empty() {
            return PolicyDecision::new(Command::Finish, "end of the route");
        }
        if self.thresholds.avoid_danger {
            options.sort_by_key(|node| node.terrain == Terrain::Danger);
        } else {
            options.sort_by(|a, b| a.distance_to_next.total_cmp(&b.distance_to_next));
        }
        let next = options[0];
        PolicyDecision::new(
            Command::TravelTo {
                node_id: next.id.clone(),
            },
            format!("heading to {}", next.name),
        )
    }

    fn pick_choice(&self, state: &GameState, event: &EventDefinition) -> PolicyDecision {
        let best = event
            .choices
            .iter()
            .enumerate()
            .filter(|(_, choice)| choice.requirements_met(state))
            .map(|(index, choice)| {
                let e = &choice.effects;
                let mut score = e.health.unwrap_or(0.0) * 2.0
                    + e.sanity.unwrap_or(0.0) * 1.5
                    + e.stamina.unwrap_or(0.0)
                    + e.thirst.unwrap_or(0.0)
                    + e.hunger.unwrap_or(0.0)
                    + f64::from(e.karma.unwrap_or(0))
                    + f64::from(e.action_points.unwrap_or(0)) * 3.0;
                if e.remove_item.is_some() {
                    score -= 5.0;
                }
                if choice.special_action() == Some(SpecialAction::Scavenge) {
                    score += if self.thresholds.scavenge && state.action_points > 0 {
                        15.0
                    } else {
                        -100.0
                    };
                }
                (index, score)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));
        let (index, score) = best.unwrap_or((0, 0.0));
        PolicyDecision::new(
            Command::ChooseEventOption { index },
            format!("score {score:.1}"),
        )
    }
}

impl PlayerPolicy for ThresholdPolicy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn loadout(&self) -> Loadout {
        self.loadout.clone()
    }

    fn decide(&mut self, view: &Observation<'_>) -> PolicyDecision {
        let state = view.state;
        match view.phase {
            Phase::Warning { reasons } => {
                let proceed = self.thresholds.push_through_warnings
                    || !reasons.contains(&WarningReason::LowStamina);
                self.declined_warning = !proceed;
                PolicyDecision::new(
                    Command::ConfirmWarning { proceed },
                    format!("{} warning(s)", reasons.len()),
                )
            }
            Phase::CookingChoice { .. } => PolicyDecision::plain(Command::CookingChoice {
                cook: has_cooking_kit(state),
            }),
            Phase::EatSnowConfirm => PolicyDecision::plain(Command::EatSnow { confirm: true }),
            Phase::RetreatConfirm => {
                let confirm = state.stats.health < self.thresholds.retreat_below_health
                    || first_held(state, FOOD).is_none();
                PolicyDecision::new(
                    Command::Retreat { confirm },
                    format!("health {:.0}", state.stats.health),
                )
            }
            Phase::Event { event_id } => match view.catalogs.events.get(event_id) {
                Some(event) => self.pick_choice(state, event),
                None => PolicyDecision::plain(Command::ChooseEventOption { index: 0 }),
            },
            Phase::EventResult { .. } => PolicyDecision::plain(Command::AcknowledgeEventResult),
            Phase::Explore => self.explore(view),
            Phase::Menu | Phase::GameOver => PolicyDecision::plain(Command::NewGame),
            Phase::Setup => PolicyDecision::plain(Command::ConfirmSetup),
            Phase::Shop => PolicyDecision::plain(Command::Checkout),
        }
    }
}

/// Fuzzing player: mostly legal moves, sometimes nonsense, seeded for replay.
struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    fn explore(&mut self, view: &Observation<'_>) -> PolicyDecision {
        let state = view.state;
        let stats = &state.stats;
        if self.rng.gen_bool(0.7) {
            if stats.thirst < 50.0
                && let Some(id) = first_held(state, WATER)
            {
                return use_item(id, "thirsty");
            }
            if stats.hunger < 50.0
                && let Some(id) = first_held(state, FOOD)
            {
                return use_item(id, "hungry");
            }
        }

        let held: Vec<&String> = state.inventory.keys().collect();
        let connections: Vec<&MapNode> = view
            .catalogs
            .map
            .connections(&state.current_node_id)
            .collect();
        match self.rng.gen_range(0..12) {
            0..=4 => PolicyDecision::plain(Command::Hike),
            5 => PolicyDecision::plain(Command::Rest),
            6 => PolicyDecision::plain(Command::Camp),
            7 => match held.choose(&mut self.rng) {
                Some(id) => use_item(id, "random item"),
                None => PolicyDecision::plain(Command::RequestEatSnow),
            },
            8 => match connections.choose(&mut self.rng) {
                Some(node) => PolicyDecision::plain(Command::TravelTo {
                    node_id: node.id.clone(),
                }),
                None => PolicyDecision::plain(Command::Finish),
            },
            9 => PolicyDecision::plain(Command::UseSpecialAbility),
            10 => PolicyDecision::plain(Command::RequestEatSnow),
            _ => PolicyDecision::plain(Command::Save),
        }
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn loadout(&self) -> Loadout {
        Loadout {
            character: "xiaomou",
            season: Season::Spring,
            purchases: &[
                ("tent", 1),
                ("stove", 1),
                ("pot", 1),
                ("gas", 1),
                ("backpack_small", 1),
                ("water_bottle", 5),
                ("food_dried_noodles", 5),
                ("food_apple", 4),
                ("medicine", 1),
                ("unobtainium", 1),
            ],
        }
    }

    fn decide(&mut self, view: &Observation<'_>) -> PolicyDecision {
        match view.phase {
            Phase::Warning { .. } => PolicyDecision::plain(Command::ConfirmWarning {
                proceed: self.rng.gen_bool(0.6),
            }),
            Phase::CookingChoice { .. } => PolicyDecision::plain(Command::CookingChoice {
                cook: self.rng.r#gen(),
            }),
            Phase::EatSnowConfirm => PolicyDecision::plain(Command::EatSnow {
                confirm: self.rng.r#gen(),
            }),
            Phase::RetreatConfirm => PolicyDecision::plain(Command::Retreat {
                confirm: self.rng.gen_bool(0.2),
            }),
            Phase::Event { event_id } => {
                let choices = view
                    .catalogs
                    .events
                    .get(event_id)
                    .map_or(1, |event| event.choices.len());
                // One past the end now and then exercises the invalid-choice guard.
                let index = self.rng.gen_range(0..=choices);
                PolicyDecision::plain(Command::ChooseEventOption { index })
            }
            Phase::EventResult { .. } => PolicyDecision::plain(Command::AcknowledgeEventResult),
            Phase::Explore => self.explore(view),
            Phase::Menu | Phase::GameOver => PolicyDecision::plain(Command::NewGame),
            Phase::Setup => PolicyDecision::plain(Command::ConfirmSetup),
            Phase::Shop => PolicyDecision::plain(Command::Checkout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view<'a>(state: &'a GameState, phase: &'a Phase, catalogs: &'a Catalogs) -> Observation<'a> {
        Observation {
            state,
            phase,
            catalogs,
            last_rejection: None,
        }
    }

    #[test]
    fn strategies_parse_and_expand() {
        let parsed =
            GameplayStrategy::parse_list(&["reckless".to_string(), "Cautious".to_string()])
                .unwrap();
        assert_eq!(
            parsed,
            vec![GameplayStrategy::Cautious, GameplayStrategy::Reckless]
        );
        assert_eq!(
            GameplayStrategy::parse_list(&["all".to_string()]).unwrap().len(),
            4
        );
        assert!(GameplayStrategy::parse_list(&["timid".to_string()]).is_err());
    }

    #[test]
    fn scripted_loadouts_fit_the_starting_budget() {
        let catalogs = Catalogs::default_catalogs();
        let state = GameState::default();
        for strategy in [
            GameplayStrategy::Cautious,
            GameplayStrategy::Balanced,
            GameplayStrategy::Reckless,
        ] {
            let loadout = strategy.create_policy(1).loadout();
            assert!(catalogs.characters.get(loadout.character).is_some());
            let cost: i64 = loadout
                .purchases
                .iter()
                .map(|(id, count)| {
                    catalogs.items.get(id).expect("known item").price * i64::from(*count)
                })
                .sum();
            assert!(cost <= state.money, "{strategy} loadout costs {cost}");
        }
    }

    #[test]
    fn thirsty_hiker_drinks_before_hiking() {
        let catalogs = Catalogs::default_catalogs();
        let mut state = GameState::default();
        state.add_item("water_bottle", 1);
        state.distance_to_next_node = 3.0;
        state.stats.thirst = 20.0;
        let mut policy = GameplayStrategy::Balanced.create_policy(1);
        let decision = policy.decide(&view(&state, &Phase::Explore, &catalogs));
        assert_eq!(
            decision.command,
            Command::UseItem {
                item_id: "water_bottle".into()
            }
        );

        state.stats.thirst = 90.0;
        let decision = policy.decide(&view(&state, &Phase::Explore, &catalogs));
        assert_eq!(decision.command, Command::Hike);
    }

    #[test]
    fn cautious_avoids_the_danger_branch() {
        let catalogs = Catalogs::default_catalogs();
        let mut state = GameState::default();
        state.current_node_id = "nav_frame".into();
        state.distance_to_next_node = 0.0;
        let mut cautious = GameplayStrategy::Cautious.create_policy(1);
        let decision = cautious.decide(&view(&state, &Phase::Explore, &catalogs));
        assert_eq!(
            decision.command,
            Command::TravelTo {
                node_id: "stone_sea".into()
            }
        );

        let mut reckless = GameplayStrategy::Reckless.create_policy(1);
        let decision = reckless.decide(&view(&state, &Phase::Explore, &catalogs));
        assert_eq!(
            decision.command,
            Command::TravelTo {
                node_id: "pine_saddle".into()
            }
        );
    }

    #[test]
    fn declining_a_stamina_warning_leads_to_rest() {
        let catalogs = Catalogs::default_catalogs();
        let mut state = GameState::default();
        state.distance_to_next_node = 3.0;
        state.stats.stamina = 15.0;
        let mut policy = GameplayStrategy::Cautious.create_policy(1);
        let mut reasons = aotai_game::controller::WarningReasons::new();
        reasons.push(WarningReason::LowStamina);
        let warning = Phase::Warning { reasons };
        let decision = policy.decide(&view(&state, &warning, &catalogs));
        assert_eq!(decision.command, Command::ConfirmWarning { proceed: false });
        state.stats.stamina = 60.0;
        state.day_time = 12;
        let decision = policy.decide(&view(&state, &Phase::Explore, &catalogs));
        assert_eq!(decision.command, Command::Rest);
    }

    #[test]
    fn random_policy_replays_for_a_seed() {
        let catalogs = Catalogs::default_catalogs();
        let mut state = GameState::default();
        state.distance_to_next_node = 2.0;
        let run = |seed| {
            let mut policy = GameplayStrategy::Random.create_policy(seed);
            (0..20)
                .map(|_| policy.decide(&view(&state, &Phase::Explore, &catalogs)).command)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
    }
}
