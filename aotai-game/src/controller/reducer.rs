//! Pure command reducer: `(SessionState, Command) -> (SessionState, CommandResult)`.
//!
//! Guards run before any mutation and every command works on a copy of the
//! session, so a rejected command never leaves partial changes behind. Storage
//! is not touched here; documents come in through [`Documents`] and writes go
//! out as a [`Persist`] request on the [`Transition`].
use serde::{Deserialize, Serialize};

use super::command::{Command, CommandResult, CommandStatus};
use super::phase::{EventReport, Phase, ReportLine, warning_reasons};
use crate::camp;
use crate::constants::{
    CAMP_HOURS, CAMP_SANITY, CAMP_STAMINA, CAMP_WARMTH_MIN_HUNGER, COOKING_KIT, HIKE_MIN_STAMINA,
    HUNGER_DRAIN_PER_TURN, LOG_ARRIVED, LOG_CAMP, LOG_CANCELLED, LOG_CART_CLEARED,
    LOG_CART_PARTIAL, LOG_CART_UPDATED, LOG_CHECKOUT, LOG_COOKED, LOG_COOKING_PROMPT,
    LOG_EAT_SNOW, LOG_EAT_SNOW_PROMPT, LOG_EVENT, LOG_EVENT_RESOLVED, LOG_GAME_OVER, LOG_HIKE,
    LOG_ITEM_RAW, LOG_ITEM_USED, LOG_LOADED, LOG_MENU, LOG_NEW_GAME, LOG_NO_SAVE, LOG_REJECTED,
    LOG_REST, LOG_RETREAT_PROMPT, LOG_SAVED, LOG_SCAVENGE, LOG_SETUP_CHARACTER, LOG_SETUP_SEASON,
    LOG_SHOP_ENTER, LOG_TELEPORT, LOG_WARNING, LOG_WARNING_CANCELLED, MAX_THIRST,
    NORMAL_BODY_TEMP, REST_STAMINA, REST_WARMTH, REST_WARMTH_MIN_HUNGER, SNOW_ALTITUDE,
    SNOW_HEALTH_LOSS, SNOW_SANITY_LOSS, SNOW_TEMP_LOSS, SNOW_THIRST_GAIN, SNOW_THIRST_MAX,
    THIRST_DRAIN_PER_TURN,
};
use crate::data::Catalogs;
use crate::environment;
use crate::error::Rejection;
use crate::events::{
    ActionPhase, EventContext, EventDefinition, EventEffect, SpecialAction, check_event,
};
use crate::items::EffectKind;
use crate::movement::{self, HikeConditions, HikeFactors};
use crate::rng::RngBundle;
use crate::season::Season;
use crate::state::{Ending, GameState};
use crate::store::{self, Cart};
use crate::weather;

/// Everything a command may change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub state: GameState,
    pub phase: Phase,
    pub cart: Cart,
}

/// Documents read from storage ahead of the commands that need them.
#[derive(Debug, Clone, Default)]
pub struct Documents {
    /// Remembered cart, validated on entering the shop.
    pub cart_template: Option<Cart>,
    /// Save document for `load`; `None` when no save exists.
    pub save: Option<GameState>,
}

/// Read-only collaborators for one reduction.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub catalogs: &'a Catalogs,
    pub rng: &'a RngBundle,
    pub documents: &'a Documents,
}

/// Storage write requested by an applied command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persist {
    SaveGame,
    SaveCart(Cart),
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub next: SessionState,
    pub result: CommandResult,
    pub persist: Option<Persist>,
}

struct Applied {
    key: &'static str,
    message: String,
    persist: Option<Persist>,
}

impl Applied {
    fn new(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
            persist: None,
        }
    }

    fn persist(mut self, persist: Persist) -> Self {
        self.persist = Some(persist);
        self
    }
}

/// Run one command against `current`, returning the next session state.
#[must_use]
pub fn reduce(current: &SessionState, command: &Command, ctx: Context<'_>) -> Transition {
    if !command.allowed_in(&current.phase) {
        return rejected(
            current,
            Rejection::WrongPhase {
                command: command.name(),
                phase: current.phase.name(),
            },
        );
    }
    let mut next = current.clone();
    match apply(&mut next, command, ctx) {
        Ok(applied) => {
            if next.phase != current.phase {
                log::info!(
                    "{}: phase {} -> {}",
                    command.name(),
                    current.phase,
                    next.phase
                );
            }
            let result = CommandResult {
                key: applied.key,
                message: applied.message,
                phase: next.phase.clone(),
                status: CommandStatus::Applied,
            };
            Transition {
                next,
                result,
                persist: applied.persist,
            }
        }
        Err(reason) => rejected(current, reason),
    }
}

fn rejected(current: &SessionState, reason: Rejection) -> Transition {
    log::debug!("command rejected in {}: {reason}", current.phase);
    Transition {
        next: current.clone(),
        result: CommandResult {
            key: LOG_REJECTED,
            message: reason.to_string(),
            phase: current.phase.clone(),
            status: CommandStatus::Rejected(reason),
        },
        persist: None,
    }
}

fn apply(s: &mut SessionState, command: &Command, ctx: Context<'_>) -> Result<Applied, Rejection> {
    match command {
        Command::NewGame => {
            s.state.reset();
            s.cart.clear();
            s.phase = Phase::Setup;
            Ok(Applied::new(
                LOG_NEW_GAME,
                "A new traverse begins. Choose your hiker and the season.",
            ))
        }
        Command::SelectCharacter { id } => select_character(s, ctx, id),
        Command::SelectSeason { season } => Ok(select_season(s, *season)),
        Command::ConfirmSetup => Ok(confirm_setup(s, ctx)),
        Command::AdjustCart {
            item_id,
            delta,
            multiplier,
        } => {
            let change = store::update_cart(
                &s.state,
                &mut s.cart,
                &ctx.catalogs.items,
                item_id,
                *delta,
                *multiplier,
            )?;
            if change.is_partial() {
                Ok(Applied::new(
                    LOG_CART_PARTIAL,
                    format!(
                        "Budget only covers {} x {}; {} not added.",
                        change.count, change.item_id, change.shortfall
                    ),
                ))
            } else {
                Ok(Applied::new(
                    LOG_CART_UPDATED,
                    format!("Cart now holds {} x {}.", change.count, change.item_id),
                ))
            }
        }
        Command::ClearCart => {
            s.cart.clear();
            Ok(Applied::new(LOG_CART_CLEARED, "Cart emptied."))
        }
        Command::Checkout => checkout(s, ctx),
        Command::Hike => hike(s, ctx, false),
        Command::ConfirmWarning { proceed: true } => hike(s, ctx, true),
        Command::ConfirmWarning { proceed: false } => {
            s.phase = Phase::Explore;
            Ok(Applied::new(
                LOG_WARNING_CANCELLED,
                "You decide not to push on.",
            ))
        }
        Command::Rest => rest(s, ctx),
        Command::Camp => camp(s, ctx),
        Command::RequestEatSnow => request_eat_snow(s, ctx),
        Command::EatSnow { confirm } => Ok(eat_snow(s, ctx, *confirm)),
        Command::UseItem { item_id } => use_item(s, ctx, item_id),
        Command::CookingChoice { cook } => cooking_choice(s, ctx, *cook),
        Command::TravelTo { node_id } => travel_to(s, ctx, node_id),
        Command::Finish => finish_route(s, ctx),
        Command::UseSpecialAbility => teleport(s, ctx),
        Command::ChooseEventOption { index } => choose_event_option(s, ctx, *index),
        Command::AcknowledgeEventResult => {
            s.phase = Phase::Explore;
            Ok(conclude(
                s,
                ctx,
                LOG_EVENT_RESOLVED,
                "You gather yourself and carry on.".to_string(),
            ))
        }
        Command::Retreat { confirm: true } => {
            end_run(s, Ending::Retreated);
            Ok(Applied::new(
                LOG_GAME_OVER,
                format!(
                    "{} You keep {} in savings.",
                    Ending::Retreated.message(),
                    s.state.money
                ),
            ))
        }
        Command::Retreat { confirm: false } => {
            s.phase = Phase::Explore;
            Ok(Applied::new(LOG_CANCELLED, "You stay on the ridge."))
        }
        Command::Save => Ok(Applied::new(LOG_SAVED, "Progress saved.").persist(Persist::SaveGame)),
        Command::Load => Ok(load(s, ctx)),
        Command::ReturnToMenu => {
            s.phase = Phase::Menu;
            Ok(Applied::new(LOG_MENU, "Back at the trailhead menu."))
        }
    }
}

fn select_character(s: &mut SessionState, ctx: Context<'_>, id: &str) -> Result<Applied, Rejection> {
    let character = ctx
        .catalogs
        .characters
        .get(id)
        .ok_or_else(|| Rejection::UnknownCharacter(id.to_string()))?;
    s.state.character_id = id.to_string();
    Ok(Applied::new(
        LOG_SETUP_CHARACTER,
        format!("{} will attempt the traverse.", character.name),
    ))
}

fn select_season(s: &mut SessionState, season: Season) -> Applied {
    s.state.season = season;
    Applied::new(LOG_SETUP_SEASON, format!("Setting out in {season}."))
}

/// Reset for the shop while keeping the setup, then restore the remembered cart.
fn confirm_setup(s: &mut SessionState, ctx: Context<'_>) -> Applied {
    let catalogs = ctx.catalogs;
    s.state.reset_keep_setup();
    if let Some(cap) = catalogs.characters.buffs(&s.state.character_id).max_stamina {
        s.state.apply_stamina_cap(cap);
    }
    s.cart = ctx
        .documents
        .cart_template
        .as_ref()
        .map(|template| store::validate_template(template, &s.state, &catalogs.items))
        .unwrap_or_default();
    s.phase = Phase::Shop;
    Applied::new(
        LOG_SHOP_ENTER,
        format!(
            "The outfitter is open. Budget {}, {} lines remembered from your last trip.",
            s.state.money,
            s.cart.lines().len()
        ),
    )
}

fn checkout(s: &mut SessionState, ctx: Context<'_>) -> Result<Applied, Rejection> {
    let catalogs = ctx.catalogs;
    let purchased = store::checkout(&mut s.state, &mut s.cart, &catalogs.items)?;
    if let Some(start) = catalogs.map.get(&s.state.current_node_id) {
        s.state.distance_to_next_node = start.distance_to_next;
    }
    environment::refresh(&mut s.state, catalogs);
    s.phase = Phase::Explore;
    Ok(Applied::new(
        LOG_CHECKOUT,
        format!("The hike begins with {} left in your wallet.", s.state.money),
    )
    .persist(Persist::SaveCart(purchased)))
}

fn hike(s: &mut SessionState, ctx: Context<'_>, confirmed: bool) -> Result<Applied, Rejection> {
    let catalogs = ctx.catalogs;
    let state = &s.state;
    if state.action_points <= 0 {
        return Err(Rejection::NoActionPoints);
    }
    if state.stats.stamina <= HIKE_MIN_STAMINA {
        return Err(Rejection::Exhausted);
    }
    if state.distance_to_next_node <= 0.0 {
        return Err(Rejection::NoDistanceRemaining);
    }
    let node = catalogs
        .map
        .get(&state.current_node_id)
        .ok_or_else(|| Rejection::UnknownNode(state.current_node_id.clone()))?;

    if !confirmed {
        let reasons = warning_reasons(&state.stats);
        if !reasons.is_empty() {
            let labels: Vec<&str> = reasons.iter().map(|reason| reason.label()).collect();
            let message = format!(
                "Warning: {}. Pushing on could be fatal.",
                labels.join(", ")
            );
            s.phase = Phase::Warning { reasons };
            return Ok(Applied::new(LOG_WARNING, message));
        }
    }

    let buffs = catalogs.characters.buffs(&state.character_id);
    let stats = state.stats;
    let conditions = HikeConditions {
        terrain: node.terrain,
        altitude: node.altitude,
        carried_weight: catalogs.items.weight_of(&state.inventory),
        wind_level: state.wind_level,
        env_temp: state.env_temp,
        weather: state.weather.current,
        stats: &stats,
        buffs: &buffs,
    };
    let factors = HikeFactors::roll(&conditions, &mut *ctx.rng.hike());
    let cost = movement::stamina_cost(&conditions);
    let distance = factors.distance();
    let covered = distance.min(state.distance_to_next_node);
    log::debug!("hike factors {factors:?}: {distance:.2} km for {cost:.1} stamina");

    let state = &mut s.state;
    state.distance_to_next_node = (state.distance_to_next_node - distance).max(0.0);
    state.distance_traveled += covered;
    state.total_distance += covered;
    state.stats.stamina -= cost;
    state.action_points -= 1;
    state.update_time(1);
    state.clamp();
    environment::refresh(state, catalogs);
    s.phase = Phase::Explore;

    let message = format!(
        "Hiked for an hour and covered {covered:.1} km; {:.1} km to the next waypoint.",
        s.state.distance_to_next_node
    );
    Ok(after_action(s, ctx, ActionPhase::Hike, LOG_HIKE, message))
}

fn rest(s: &mut SessionState, ctx: Context<'_>) -> Result<Applied, Rejection> {
    let state = &mut s.state;
    if state.action_points <= 0 {
        return Err(Rejection::NoActionPoints);
    }
    state.stats.stamina += REST_STAMINA;
    if state.stats.hunger > REST_WARMTH_MIN_HUNGER {
        state.stats.temperature = (state.stats.temperature + REST_WARMTH).min(NORMAL_BODY_TEMP);
    }
    state.action_points -= 1;
    state.update_time(1);
    state.clamp();
    environment::refresh(state, ctx.catalogs);
    Ok(after_action(
        s,
        ctx,
        ActionPhase::Rest,
        LOG_REST,
        "You rest for an hour and get your breath back.".to_string(),
    ))
}

fn camp(s: &mut SessionState, ctx: Context<'_>) -> Result<Applied, Rejection> {
    let catalogs = ctx.catalogs;
    let state = &mut s.state;
    if !catalogs
        .items
        .any_with_flag(&state.inventory, EffectKind::CanCamp)
    {
        return Err(Rejection::NoShelter);
    }
    state.stats.stamina += CAMP_STAMINA;
    state.stats.sanity += CAMP_SANITY;
    let warmed = state.stats.hunger > CAMP_WARMTH_MIN_HUNGER;
    if warmed {
        state.stats.temperature = NORMAL_BODY_TEMP;
    }
    state.update_time(CAMP_HOURS);
    state.clamp();
    environment::refresh(state, catalogs);
    let next = weather::next_weather(state.weather.current, state.season, &mut *ctx.rng.weather());
    state.weather.advance(next);
    let spoiled = camp::spoil_items(state, &catalogs.items, &mut *ctx.rng.camp());

    let mut message = format!("You camp for {CAMP_HOURS} hours.");
    if warmed {
        message.push_str(" The tent is warm and your body temperature recovers.");
    }
    if !spoiled.is_empty() {
        message.push_str(&format!(" Spoiled and discarded: {}.", spoiled.join(", ")));
    }
    Ok(after_action(s, ctx, ActionPhase::Camp, LOG_CAMP, message))
}

fn request_eat_snow(s: &mut SessionState, ctx: Context<'_>) -> Result<Applied, Rejection> {
    let state = &s.state;
    let altitude = ctx
        .catalogs
        .map
        .get(&state.current_node_id)
        .map_or(0.0, |node| node.altitude);
    let snow_nearby = state.weather.current.is_snowy() || altitude > SNOW_ALTITUDE;
    if state.stats.thirst > SNOW_THIRST_MAX || !snow_nearby {
        return Err(Rejection::CannotEatSnow);
    }
    s.phase = Phase::EatSnowConfirm;
    Ok(Applied::new(
        LOG_EAT_SNOW_PROMPT,
        "Eating snow quenches thirst but chills you to the core. Go ahead?",
    ))
}

fn eat_snow(s: &mut SessionState, ctx: Context<'_>, confirm: bool) -> Applied {
    s.phase = Phase::Explore;
    if !confirm {
        return Applied::new(LOG_CANCELLED, "You leave the snow alone.");
    }
    let stats = &mut s.state.stats;
    stats.thirst = (stats.thirst + SNOW_THIRST_GAIN).min(MAX_THIRST);
    stats.temperature -= SNOW_TEMP_LOSS;
    stats.health -= SNOW_HEALTH_LOSS;
    stats.sanity -= SNOW_SANITY_LOSS;
    s.state.clamp();
    s.state.record_lows();
    conclude(
        s,
        ctx,
        LOG_EAT_SNOW,
        "You eat a mouthful of snow. Your thirst eases but you shiver hard.".to_string(),
    )
}

fn use_item(s: &mut SessionState, ctx: Context<'_>, item_id: &str) -> Result<Applied, Rejection> {
    let item = ctx
        .catalogs
        .items
        .get(item_id)
        .ok_or_else(|| Rejection::UnknownItem(item_id.to_string()))?;
    if !s.state.has_item(item_id) {
        return Err(Rejection::ItemNotHeld(item_id.to_string()));
    }
    if !item.is_consumable() {
        return Err(Rejection::NotConsumable(item_id.to_string()));
    }
    if item.has_flag(EffectKind::NeedsCooking) {
        if COOKING_KIT.iter().all(|tool| s.state.has_item(tool)) {
            s.phase = Phase::CookingChoice {
                item_id: item_id.to_string(),
            };
            return Ok(Applied::new(
                LOG_COOKING_PROMPT,
                format!("Cook the {} or eat it as it is?", item.name),
            ));
        }
        s.state.consume_item(item, false);
        return Ok(Applied::new(
            LOG_ITEM_RAW,
            format!(
                "Without a stove, pot and gas you chew the {} raw. It does half as much good.",
                item.name
            ),
        ));
    }
    s.state.consume_item(item, true);
    Ok(Applied::new(LOG_ITEM_USED, format!("Used {}.", item.name)))
}

fn cooking_choice(s: &mut SessionState, ctx: Context<'_>, cook: bool) -> Result<Applied, Rejection> {
    let Phase::CookingChoice { item_id } = &s.phase else {
        return Err(Rejection::WrongPhase {
            command: "cooking_choice",
            phase: s.phase.name(),
        });
    };
    let item = ctx
        .catalogs
        .items
        .get(item_id)
        .ok_or_else(|| Rejection::UnknownItem(item_id.clone()))?;
    if !s.state.consume_item(item, cook) {
        return Err(Rejection::ItemNotHeld(item_id.clone()));
    }
    s.phase = Phase::Explore;
    if cook {
        Ok(Applied::new(
            LOG_COOKED,
            format!("A steaming bowl of {}. Delicious.", item.name),
        ))
    } else {
        Ok(Applied::new(
            LOG_ITEM_RAW,
            format!("You eat the {} dry. It tastes awful.", item.name),
        ))
    }
}

/// Move onto `node_id` and set up its leg; a retreat waypoint asks before continuing.
fn arrive(s: &mut SessionState, ctx: Context<'_>, node_id: &str) -> Result<(&'static str, String), Rejection> {
    let node = ctx
        .catalogs
        .map
        .get(node_id)
        .ok_or_else(|| Rejection::UnknownNode(node_id.to_string()))?;
    let state = &mut s.state;
    state.current_node_id = node.id.clone();
    state.distance_to_next_node = node.distance_to_next;
    state.distance_traveled = 0.0;
    environment::observe(state, ctx.catalogs);
    if node.retreat {
        s.phase = Phase::RetreatConfirm;
        return Ok((
            LOG_RETREAT_PROMPT,
            format!(
                "You reach {}. This is the last safe way down. Retreat?",
                node.name
            ),
        ));
    }
    s.phase = Phase::Explore;
    Ok((LOG_ARRIVED, format!("You reach {}.", node.name)))
}

fn travel_to(s: &mut SessionState, ctx: Context<'_>, node_id: &str) -> Result<Applied, Rejection> {
    let state = &s.state;
    if state.distance_to_next_node > 0.0 {
        return Err(Rejection::NotAtWaypoint {
            remaining: state.distance_to_next_node,
        });
    }
    if ctx.catalogs.map.get(node_id).is_none() {
        return Err(Rejection::UnknownNode(node_id.to_string()));
    }
    if !ctx.catalogs.map.is_connected(&state.current_node_id, node_id) {
        return Err(Rejection::NotConnected {
            from: state.current_node_id.clone(),
            to: node_id.to_string(),
        });
    }
    let (key, message) = arrive(s, ctx, node_id)?;
    Ok(Applied::new(key, message))
}

fn finish_route(s: &mut SessionState, ctx: Context<'_>) -> Result<Applied, Rejection> {
    let state = &s.state;
    if state.distance_to_next_node > 0.0 {
        return Err(Rejection::NotAtWaypoint {
            remaining: state.distance_to_next_node,
        });
    }
    let terminal = ctx
        .catalogs
        .map
        .get(&state.current_node_id)
        .is_some_and(crate::map::MapNode::is_terminal);
    if !terminal {
        return Err(Rejection::NotTerminal);
    }
    end_run(s, Ending::Victory);
    Ok(Applied::new(LOG_GAME_OVER, Ending::Victory.message()))
}

fn teleport(s: &mut SessionState, ctx: Context<'_>) -> Result<Applied, Rejection> {
    let catalogs = ctx.catalogs;
    let state = &s.state;
    let buffs = catalogs.characters.buffs(&state.character_id);
    if !buffs.teleport || state.teleport_used || state.distance_to_next_node <= 0.0 {
        return Err(Rejection::AbilityUnavailable);
    }
    let target = catalogs
        .map
        .connections(&state.current_node_id)
        .next()
        .map(|node| node.id.clone())
        .ok_or(Rejection::AbilityUnavailable)?;
    s.state.teleport_used = true;
    let (key, message) = arrive(s, ctx, &target)?;
    let key = if key == LOG_ARRIVED { LOG_TELEPORT } else { key };
    Ok(Applied::new(
        key,
        format!("You blink and the trail folds around you. {message}"),
    ))
}

fn choose_event_option(
    s: &mut SessionState,
    ctx: Context<'_>,
    index: usize,
) -> Result<Applied, Rejection> {
    let catalogs = ctx.catalogs;
    let Phase::Event { event_id } = &s.phase else {
        return Err(Rejection::WrongPhase {
            command: "choose_event_option",
            phase: s.phase.name(),
        });
    };
    let event = catalogs
        .events
        .get(event_id)
        .ok_or_else(|| Rejection::UnknownEvent(event_id.clone()))?;
    let choice = event
        .choices
        .get(index)
        .ok_or(Rejection::InvalidChoice(index))?;
    let missing: Vec<&str> = choice
        .requirements
        .items
        .iter()
        .filter(|id| !s.state.has_item(id))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(Rejection::RequirementUnmet(missing.join(", ")));
    }
    if choice.special_action() == Some(SpecialAction::Scavenge) && s.state.action_points < 1 {
        return Err(Rejection::NoActionPoints);
    }

    let mut report = EventReport {
        event_id: event.id.clone(),
        choice: index,
        narrative: None,
        changes: Vec::new(),
    };
    let mut key = LOG_EVENT_RESOLVED;
    let state = &mut s.state;
    for effect in choice.effects.to_effects() {
        match effect {
            EventEffect::Stat(target, delta) => {
                state.stats.adjust(target, delta);
                report.changes.push(ReportLine::Stat { target, delta });
            }
            EventEffect::Karma(delta) => {
                state.karma = state.karma.saturating_add(delta);
                report.changes.push(ReportLine::Karma { delta });
            }
            EventEffect::RemoveItem(item_id) => {
                if catalogs.items.contains(&item_id) && state.remove_item(&item_id, 1) {
                    report.changes.push(ReportLine::ItemLost { item_id });
                }
            }
            EventEffect::ChangeWeather(weather) => {
                state.weather.force(weather);
                environment::observe(state, catalogs);
                report.changes.push(ReportLine::Weather {
                    weather: state.weather.current,
                });
            }
            EventEffect::ActionPoints(delta) => {
                state.action_points += delta;
                report.changes.push(ReportLine::ActionPoints { delta });
            }
            EventEffect::StaminaCostMultiplier(multiplier) => {
                report.changes.push(ReportLine::StaminaCost { multiplier });
            }
            EventEffect::Message(text) => report.narrative = Some(text),
            EventEffect::Special(SpecialAction::Scavenge) => {
                state.action_points -= 1;
                state.update_time(1);
                let find = camp::scavenge(state, &catalogs.items, &mut *ctx.rng.camp());
                report.changes.push(ReportLine::Scavenged { find });
                key = LOG_SCAVENGE;
            }
        }
    }
    state.clamp();
    state.record_lows();

    let message = report
        .narrative
        .clone()
        .unwrap_or_else(|| choice.text.clone());
    s.phase = Phase::EventResult { report };
    Ok(Applied::new(key, message))
}

fn load(s: &mut SessionState, ctx: Context<'_>) -> Applied {
    let Some(saved) = &ctx.documents.save else {
        return Applied::new(LOG_NO_SAVE, "There is no saved game.");
    };
    s.state = saved.clone();
    s.state.clamp();
    s.cart.clear();
    s.phase = Phase::Explore;
    Applied::new(LOG_LOADED, "Saved game loaded.")
}

/// Roll for an event after an explore action; otherwise close the turn.
fn after_action(
    s: &mut SessionState,
    ctx: Context<'_>,
    action: ActionPhase,
    key: &'static str,
    message: String,
) -> Applied {
    let catalogs = ctx.catalogs;
    let event = check_event(
        &s.state,
        &catalogs.map,
        &catalogs.events,
        EventContext::for_phase(action),
        &mut *ctx.rng.events(),
    );
    match event {
        Some(event) => {
            trigger_event(s, event);
            Applied::new(LOG_EVENT, format!("{message} {}", event_banner(event)))
        }
        None => conclude(s, ctx, key, message),
    }
}

fn event_banner(event: &EventDefinition) -> String {
    if event.description.is_empty() {
        event.name.clone()
    } else {
        format!("{}: {}", event.name, event.description)
    }
}

fn trigger_event(s: &mut SessionState, event: &EventDefinition) {
    s.state.triggered_events.insert(event.id.clone());
    s.phase = Phase::Event {
        event_id: event.id.clone(),
    };
    log::info!("event `{}` triggered", event.id);
}

/// Close the turn and fold a game over into the reply.
fn conclude(s: &mut SessionState, ctx: Context<'_>, key: &'static str, message: String) -> Applied {
    match end_turn(s, ctx.catalogs) {
        Some(ending) => Applied::new(LOG_GAME_OVER, format!("{message} {}", ending.message())),
        None => Applied::new(key, message),
    }
}

/// Passive drain, clamp, then the game-over check.
fn end_turn(s: &mut SessionState, catalogs: &Catalogs) -> Option<Ending> {
    let drain_mult = catalogs
        .characters
        .buffs(&s.state.character_id)
        .hunger_drain_mult();
    let stats = &mut s.state.stats;
    stats.hunger -= HUNGER_DRAIN_PER_TURN * drain_mult;
    stats.thirst -= THIRST_DRAIN_PER_TURN;
    s.state.clamp();
    s.state.record_lows();
    let ending = s.state.check_game_over(&catalogs.map)?;
    end_run(s, ending);
    Some(ending)
}

fn end_run(s: &mut SessionState, ending: Ending) {
    s.state.finish(ending);
    s.phase = Phase::GameOver;
    log::info!(
        "run ended: {ending} after {} days",
        s.state.statistics.days_survived
    );
}
