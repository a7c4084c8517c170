use super::command::{Command, CommandResult, CommandStatus};
use super::phase::Phase;
use super::reducer::{self, Context, Documents, Persist, SessionState};
use crate::GameStorage;
use crate::constants::LOG_PERSIST_FAILED;
use crate::data::Catalogs;
use crate::rng::RngBundle;
use crate::state::GameState;
use crate::store::Cart;

/// Save slot used by the `save` and `load` commands.
pub const SAVE_SLOT: &str = "savegame";

/// Owns the only mutable game state and applies commands in arrival order.
///
/// The session reads storage documents ahead of the commands that need them
/// and carries out the writes the reducer requests. Persistence failures are
/// reported on the result and never change in-memory state.
#[derive(Debug)]
pub struct GameSession<S: GameStorage> {
    session: SessionState,
    catalogs: Catalogs,
    rng: RngBundle,
    storage: S,
}

impl<S: GameStorage> GameSession<S> {
    #[must_use]
    pub fn new(catalogs: Catalogs, rng: RngBundle, storage: S) -> Self {
        Self {
            session: SessionState::default(),
            catalogs,
            rng,
            storage,
        }
    }

    /// Apply one command and return its outcome.
    pub fn dispatch(&mut self, command: Command) -> CommandResult {
        let documents = match self.documents_for(&command) {
            Ok(documents) => documents,
            Err(err) => {
                log::warn!("{} failed: {err}", command.name());
                return self.failed(format!("Could not read the saved game: {err}"));
            }
        };
        let transition = reducer::reduce(
            &self.session,
            &command,
            Context {
                catalogs: &self.catalogs,
                rng: &self.rng,
                documents: &documents,
            },
        );

        match transition.persist {
            Some(Persist::SaveGame) => {
                if let Err(err) = self.storage.save_game(SAVE_SLOT, &transition.next.state) {
                    log::warn!("save failed: {err}");
                    return self.failed(format!("Could not save the game: {err}"));
                }
                log::info!("game saved to slot `{SAVE_SLOT}`");
            }
            Some(Persist::SaveCart(cart)) => {
                if let Err(err) = self.storage.save_cart(&cart) {
                    log::warn!("cart template not saved: {err}");
                }
            }
            None => {}
        }
        if matches!(command, Command::Load) && transition.result.is_applied() {
            log::info!("game loaded from slot `{SAVE_SLOT}`");
        }
        self.session = transition.next;
        transition.result
    }

    fn documents_for(&self, command: &Command) -> Result<Documents, S::Error> {
        let mut documents = Documents::default();
        if !command.allowed_in(&self.session.phase) {
            return Ok(documents);
        }
        match command {
            Command::ConfirmSetup => {
                documents.cart_template = self.storage.load_cart().unwrap_or_else(|err| {
                    log::warn!("ignoring unreadable cart template: {err}");
                    None
                });
            }
            Command::Load => documents.save = self.storage.load_game(SAVE_SLOT)?,
            _ => {}
        }
        Ok(documents)
    }

    fn failed(&self, message: String) -> CommandResult {
        CommandResult {
            key: LOG_PERSIST_FAILED,
            status: CommandStatus::Failed(message.clone()),
            message,
            phase: self.session.phase.clone(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.session.state
    }

    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.session.phase
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.session.cart
    }

    #[must_use]
    pub const fn snapshot(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub const fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.session.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;

    fn session(storage: MemoryStorage) -> GameSession<MemoryStorage> {
        GameSession::new(
            Catalogs::default_catalogs(),
            RngBundle::from_user_seed(11),
            storage,
        )
    }

    fn into_explore(session: &mut GameSession<MemoryStorage>) {
        session.dispatch(Command::NewGame);
        session.dispatch(Command::ConfirmSetup);
        session.dispatch(Command::AdjustCart {
            item_id: "water_bottle".into(),
            delta: 2,
            multiplier: 1,
        });
        let result = session.dispatch(Command::Checkout);
        assert!(result.is_applied(), "{}", result.message);
    }

    #[test]
    fn checkout_remembers_the_cart_for_the_next_run() {
        let storage = MemoryStorage::new();
        let mut game = session(storage.clone());
        into_explore(&mut game);
        assert_eq!(*game.phase(), Phase::Explore);
        assert_eq!(game.state().item_count("water_bottle"), 2);

        game.dispatch(Command::ReturnToMenu);
        game.dispatch(Command::NewGame);
        game.dispatch(Command::ConfirmSetup);
        assert_eq!(game.cart().count("water_bottle"), 2);
    }

    #[test]
    fn failed_save_reports_and_keeps_state() {
        let storage = MemoryStorage::new();
        let mut game = session(storage.clone());
        into_explore(&mut game);
        storage.set_read_only(true);
        let before = game.snapshot().clone();
        let result = game.dispatch(Command::Save);
        assert!(matches!(result.status, CommandStatus::Failed(_)));
        assert_eq!(game.snapshot(), &before);
        assert!(storage.raw_save(SAVE_SLOT).is_none());
    }

    #[test]
    fn corrupt_save_fails_without_touching_state() {
        let storage = MemoryStorage::new();
        storage.put_raw_save(SAVE_SLOT, "{\"money\": ");
        let mut game = session(storage);
        let result = game.dispatch(Command::Load);
        assert!(matches!(result.status, CommandStatus::Failed(_)));
        assert_eq!(*game.phase(), Phase::Menu);
        assert_eq!(game.state(), &GameState::default());
    }

    #[test]
    fn save_then_load_restores_the_run() {
        let storage = MemoryStorage::new();
        let mut game = session(storage.clone());
        into_explore(&mut game);
        let saved = game.state().clone();
        assert!(game.dispatch(Command::Save).is_applied());

        let mut fresh = session(storage);
        let result = fresh.dispatch(Command::Load);
        assert!(result.is_applied(), "{}", result.message);
        assert_eq!(*fresh.phase(), Phase::Explore);
        let loaded = fresh.state();
        assert_eq!(loaded.money, saved.money);
        assert_eq!(loaded.inventory, saved.inventory);
        assert_eq!(loaded.current_node_id, saved.current_node_id);
        assert_eq!(loaded.day_time, saved.day_time);
    }
}
