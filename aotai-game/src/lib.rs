//! Aotai Traverse Game Engine
//!
//! Platform-agnostic simulation core for the Aotai ridge traverse survival game.
//! The crate owns every rule of the game: catalogs, environment and physiology
//! models, weather and events, and the phase state machine that sequences a run.
//! Presentation layers only read [`GameState`] snapshots and dispatch [`Command`]s.

pub mod camp;
pub mod characters;
pub mod constants;
pub mod controller;
pub mod data;
pub mod environment;
pub mod error;
pub mod events;
pub mod fs;
pub mod items;
pub mod map;
pub mod memory;
pub mod movement;
pub mod numbers;
pub mod result;
pub mod rng;
pub mod season;
pub mod state;
pub mod store;
pub mod weather;

// Re-export commonly used types
pub use camp::{FindTier, ScavengeFind, scavenge, spoil_items};
pub use characters::{Character, CharacterBuffs, CharacterRoster};
pub use controller::{
    Command, CommandResult, CommandStatus, EventReport, GameSession, Phase, ReportLine,
    SessionState, WarningReason,
};
pub use data::{CatalogError, CatalogKind, Catalogs, EmbeddedLoader};
pub use environment::{AltitudeBand, Readings, TemperatureBand, WindBand};
pub use error::{Rejection, StorageError};
pub use events::{
    ActionPhase, EventCatalog, EventChoice, EventContext, EventDefinition, check_event,
};
pub use fs::{FsDataLoader, FsStorage};
pub use items::{EffectKind, EffectValue, ItemCatalog, ItemDef, ItemKind, StatTarget};
pub use map::{MapGraph, MapNode, Terrain};
pub use memory::MemoryStorage;
pub use movement::{HikeConditions, HikeFactors};
pub use result::{Rank, ResultSummary, result_summary};
pub use rng::{CountingRng, RngBundle};
pub use season::{Season, SeasonTable};
pub use state::{Ending, GameState, RunStatistics, Stats};
pub use store::{Cart, CartChange};
pub use weather::{Weather, WeatherEffect, WeatherState, next_weather};

/// Trait for abstracting catalog loading.
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the raw JSON text of one static catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    fn load_document(&self, kind: CatalogKind) -> Result<String, Self::Error>;
}

/// Trait for abstracting save/load operations.
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load game state; `Ok(None)` when no save exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the save exists but cannot be read or parsed.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;

    /// Remember the last purchased cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be written.
    fn save_cart(&self, cart: &Cart) -> Result<(), Self::Error>;

    /// Load the remembered cart; `Ok(None)` when none was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the template exists but cannot be read or parsed.
    fn load_cart(&self) -> Result<Option<Cart>, Self::Error>;
}

/// Main game engine for managing game sessions
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Catalogs from the engine's loader; missing or invalid documents degrade to empty.
    #[must_use]
    pub fn catalogs(&self) -> Catalogs {
        Catalogs::load(&self.data_loader)
    }

    /// Start a session at the main menu with RNG streams derived from `seed`.
    #[must_use]
    pub fn create_session(&self, seed: u64) -> GameSession<S>
    where
        S: Clone,
    {
        GameSession::new(self.catalogs(), RngBundle::from_user_seed(seed), self.storage.clone())
    }

    /// Save a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    pub fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), S::Error> {
        self.storage.save_game(save_name, game_state)
    }

    /// Load a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the save exists but cannot be loaded.
    pub fn load_game(&self, save_name: &str) -> Result<Option<GameState>, S::Error> {
        self.storage.load_game(save_name)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::field_reassign_with_default)]
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_document(&self, kind: CatalogKind) -> Result<String, Self::Error> {
            EmbeddedLoader.load_document(kind)
        }
    }

    #[test]
    fn engine_creates_and_roundtrips_state() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::default());
        let mut state = GameState::default();
        state.money = 250;
        state.game_time = 3;
        engine.save_game("slot-one", &state).unwrap();

        let loaded = engine.load_game("slot-one").unwrap().expect("save exists");
        assert_eq!(loaded.money, 250);
        assert_eq!(loaded.game_time, 3);
        assert!(engine.load_game("missing-slot").unwrap().is_none());
    }

    #[test]
    fn sessions_start_at_the_menu_with_loaded_catalogs() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::default());
        let session = engine.create_session(7);
        assert_eq!(*session.phase(), Phase::Menu);
        assert!(!session.catalogs().map.is_empty());
    }
}
