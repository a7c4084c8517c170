//! In-memory [`GameStorage`] for headless runs and tests.
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use crate::GameStorage;
use crate::error::StorageError;
use crate::state::GameState;
use crate::store::Cart;

/// Documents kept as JSON text so corrupt saves can be simulated.
///
/// Clones share the same backing store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    saves: Rc<RefCell<HashMap<String, String>>>,
    cart: Rc<RefCell<Option<String>>>,
    read_only: Rc<Cell<bool>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail with a permission error.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    /// Store raw text under `save_name`, bypassing serialization.
    pub fn put_raw_save(&self, save_name: &str, text: &str) {
        self.saves
            .borrow_mut()
            .insert(save_name.to_string(), text.to_string());
    }

    #[must_use]
    pub fn raw_save(&self, save_name: &str) -> Option<String> {
        self.saves.borrow().get(save_name).cloned()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.read_only.get() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "storage is read-only",
            )));
        }
        Ok(())
    }
}

impl GameStorage for MemoryStorage {
    type Error = StorageError;

    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error> {
        self.check_writable()?;
        let text = serde_json::to_string(game_state)?;
        self.saves.borrow_mut().insert(save_name.to_string(), text);
        Ok(())
    }

    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error> {
        let saves = self.saves.borrow();
        let Some(text) = saves.get(save_name) else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(text)?))
    }

    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
        self.check_writable()?;
        self.saves.borrow_mut().remove(save_name);
        Ok(())
    }

    fn save_cart(&self, cart: &Cart) -> Result<(), Self::Error> {
        self.check_writable()?;
        *self.cart.borrow_mut() = Some(serde_json::to_string(cart)?);
        Ok(())
    }

    fn load_cart(&self) -> Result<Option<Cart>, Self::Error> {
        self.cart
            .borrow()
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(StorageError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_documents() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();
        storage.save_game("slot", &GameState::default()).unwrap();
        assert!(handle.load_game("slot").unwrap().is_some());
        handle.delete_save("slot").unwrap();
        assert!(storage.load_game("slot").unwrap().is_none());
    }

    #[test]
    fn corrupt_and_read_only_documents_error() {
        let storage = MemoryStorage::new();
        storage.put_raw_save("slot", "{ not json");
        assert!(matches!(
            storage.load_game("slot"),
            Err(StorageError::Serialization(_))
        ));
        storage.set_read_only(true);
        assert!(matches!(
            storage.save_cart(&Cart::new()),
            Err(StorageError::Io(_))
        ));
        assert!(storage.load_cart().unwrap().is_none());
    }
}
