//! Centralized balance and tuning constants for the traverse simulation.
//!
//! Every formula in the engine reads its coefficients from here so that
//! balance changes only happen through reviewed code changes.

// Player limits --------------------------------------------------------------
pub const MAX_STAMINA: f64 = 100.0;
pub const MAX_HUNGER: f64 = 100.0;
pub const MAX_THIRST: f64 = 100.0;
pub const MAX_SANITY: f64 = 100.0;
pub const MAX_HEALTH: f64 = 100.0;
pub const MIN_BODY_TEMP: f64 = 30.0;
pub const MAX_BODY_TEMP: f64 = 42.0;
pub const START_BODY_TEMP: f64 = 36.5;
pub const NORMAL_BODY_TEMP: f64 = 37.0;

// Economy and time -----------------------------------------------------------
pub const DAILY_ACTION_POINTS: i32 = 10;
pub const START_MONEY: i64 = 2_000;
pub const MAX_WEIGHT_BASE: f64 = 20.0;
pub const START_HOUR: u32 = 8;
pub const HOURS_PER_DAY: u32 = 24;
pub const START_NODE_ID: &str = "start";
pub const DEFAULT_CHARACTER_ID: &str = "xiaomou";

// Environment ----------------------------------------------------------------
pub(crate) const LAPSE_RATE_PER_KM: f64 = 6.5;
pub(crate) const NIGHT_TEMP_PENALTY: f64 = -5.0;
pub(crate) const COMFORT_THRESHOLD: f64 = 10.0;
pub(crate) const WIND_BASE: u8 = 1;
pub(crate) const WIND_MAX: u8 = 10;
pub(crate) const WIND_ALTITUDE_STEPS: [f64; 3] = [2_500.0, 3_000.0, 3_400.0];
pub(crate) const HEAT_LOSS_PER_DEGREE: f64 = 0.02;
pub(crate) const HUNGRY_HEAT_LOSS: f64 = 0.05;
pub(crate) const STARVING_HEAT_LOSS: f64 = 0.1;
pub(crate) const WELL_FED_HEAT_OFFSET: f64 = 0.02;
pub(crate) const WARM_RECOVERY: f64 = 0.1;
pub(crate) const FED_RECOVERY: f64 = 0.1;
pub(crate) const FEAST_RECOVERY: f64 = 0.1;

// Movement -------------------------------------------------------------------
pub(crate) const BASE_SPEED_KMH: f64 = 2.0;
pub(crate) const BASE_STAMINA_COST: f64 = 15.0;
pub(crate) const ALTITUDE_PENALTY_START: f64 = 2_500.0;
pub(crate) const ALTITUDE_PENALTY_SPAN: f64 = 5_000.0;
pub(crate) const MIN_ALTITUDE_FACTOR: f64 = 0.5;
pub(crate) const LIGHT_PACK_RATIO: f64 = 0.8;
pub(crate) const LIGHT_PACK_BONUS: f64 = 1.1;
pub(crate) const OVERWEIGHT_PENALTY_PER_KG: f64 = 0.05;
pub(crate) const MIN_WEIGHT_FACTOR: f64 = 0.5;
pub(crate) const RANDOM_FACTOR_MIN: f64 = 0.8;
pub(crate) const RANDOM_FACTOR_MAX: f64 = 1.2;
pub(crate) const WIND_COST_PER_LEVEL: f64 = 0.05;
pub(crate) const COLD_COST_PER_DEGREE: f64 = 0.02;
pub(crate) const HIKE_MIN_STAMINA: f64 = 10.0;

// Warning gate ---------------------------------------------------------------
pub(crate) const WARN_HEALTH_BELOW: f64 = 30.0;
pub(crate) const WARN_STAMINA_BELOW: f64 = 20.0;
pub(crate) const WARN_SANITY_BELOW: f64 = 20.0;

// Turn resolution ------------------------------------------------------------
pub(crate) const HUNGER_DRAIN_PER_TURN: f64 = 2.0;
pub(crate) const THIRST_DRAIN_PER_TURN: f64 = 3.0;
pub(crate) const HYPOTHERMIA_DEATH_TEMP: f64 = 32.0;

// Actions --------------------------------------------------------------------
pub(crate) const REST_STAMINA: f64 = 15.0;
pub(crate) const REST_WARMTH: f64 = 0.5;
pub(crate) const REST_WARMTH_MIN_HUNGER: f64 = 30.0;
pub(crate) const CAMP_STAMINA: f64 = 50.0;
pub(crate) const CAMP_SANITY: f64 = 20.0;
pub(crate) const CAMP_WARMTH_MIN_HUNGER: f64 = 20.0;
pub(crate) const CAMP_HOURS: u32 = 12;
pub(crate) const SNOW_THIRST_MAX: f64 = 30.0;
pub(crate) const SNOW_ALTITUDE: f64 = 3_000.0;
pub(crate) const SNOW_THIRST_GAIN: f64 = 20.0;
pub(crate) const SNOW_TEMP_LOSS: f64 = 2.0;
pub(crate) const SNOW_HEALTH_LOSS: f64 = 5.0;
pub(crate) const SNOW_SANITY_LOSS: f64 = 10.0;
pub(crate) const RAW_FOOD_RATIO: f64 = 0.5;
pub(crate) const COOKING_KIT: [&str; 3] = ["stove", "pot", "gas"];

// Events ---------------------------------------------------------------------
pub(crate) const DEFAULT_EVENT_CHANCE: f64 = 0.1;
pub(crate) const NIGHT_EVENT_BEFORE: u32 = 6;
pub(crate) const NIGHT_EVENT_AFTER: u32 = 19;

// Scavenging -----------------------------------------------------------------
pub(crate) const KARMA_LUCK_PER_POINT: f64 = 0.005;
pub(crate) const SCAVENGE_NOTHING_BELOW: f64 = 0.1;
pub(crate) const SCAVENGE_COMMON_BELOW: f64 = 0.5;
pub(crate) const SCAVENGE_RARE_BELOW: f64 = 0.8;
pub(crate) const SCAVENGE_COMMON: [&str; 4] =
    ["water_bottle", "food_instant_noodles", "food_naan", "candy"];
pub(crate) const SCAVENGE_RARE: [&str; 4] = ["gas", "batteries", "medicine", "food_beef_jerky"];
pub(crate) const SCAVENGE_PRECIOUS: [&str; 3] = ["first_aid_kit", "liquor", "food_high_energy"];

// Result ranks ---------------------------------------------------------------
pub(crate) const SPEED_RUN_MAX_DAYS: u32 = 5;
pub(crate) const RESILIENT_MIN_DAYS: u32 = 3;
pub(crate) const HYPOTHERMIA_RANK_TEMP: f64 = 34.0;

// Message keys ---------------------------------------------------------------
pub(crate) const LOG_NEW_GAME: &str = "log.menu.new-game";
pub(crate) const LOG_MENU: &str = "log.menu.return";
pub(crate) const LOG_SETUP_CHARACTER: &str = "log.setup.character";
pub(crate) const LOG_SETUP_SEASON: &str = "log.setup.season";
pub(crate) const LOG_SHOP_ENTER: &str = "log.shop.enter";
pub(crate) const LOG_CART_UPDATED: &str = "log.shop.cart-updated";
pub(crate) const LOG_CART_PARTIAL: &str = "log.shop.budget-limited";
pub(crate) const LOG_CART_CLEARED: &str = "log.shop.cart-cleared";
pub(crate) const LOG_CHECKOUT: &str = "log.shop.checkout";
pub(crate) const LOG_HIKE: &str = "log.hike.progress";
pub(crate) const LOG_WARNING: &str = "log.hike.warning";
pub(crate) const LOG_WARNING_CANCELLED: &str = "log.hike.cancelled";
pub(crate) const LOG_REST: &str = "log.rest";
pub(crate) const LOG_CAMP: &str = "log.camp";
pub(crate) const LOG_EAT_SNOW_PROMPT: &str = "log.snow.prompt";
pub(crate) const LOG_EAT_SNOW: &str = "log.snow.eaten";
pub(crate) const LOG_CANCELLED: &str = "log.cancelled";
pub(crate) const LOG_ITEM_USED: &str = "log.item.used";
pub(crate) const LOG_ITEM_RAW: &str = "log.item.raw";
pub(crate) const LOG_COOKING_PROMPT: &str = "log.item.cooking-prompt";
pub(crate) const LOG_COOKED: &str = "log.item.cooked";
pub(crate) const LOG_ARRIVED: &str = "log.travel.arrived";
pub(crate) const LOG_RETREAT_PROMPT: &str = "log.travel.retreat-prompt";
pub(crate) const LOG_TELEPORT: &str = "log.ability.teleport";
pub(crate) const LOG_EVENT: &str = "log.event.triggered";
pub(crate) const LOG_EVENT_RESOLVED: &str = "log.event.resolved";
pub(crate) const LOG_SCAVENGE: &str = "log.event.scavenge";
pub(crate) const LOG_SAVED: &str = "log.save.saved";
pub(crate) const LOG_LOADED: &str = "log.save.loaded";
pub(crate) const LOG_NO_SAVE: &str = "log.save.missing";
pub(crate) const LOG_PERSIST_FAILED: &str = "log.save.failed";
pub(crate) const LOG_REJECTED: &str = "log.rejected";
pub(crate) const LOG_GAME_OVER: &str = "log.game-over";
