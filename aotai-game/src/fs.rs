//! Filesystem-backed catalog loader and save storage.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::data::{CatalogError, CatalogKind};
use crate::error::StorageError;
use crate::state::GameState;
use crate::store::Cart;
use crate::{DataLoader, GameStorage};

const CART_FILE: &str = "last_cart.json";

/// Reads catalogs from a data directory laid out like `assets/data`.
#[derive(Debug, Clone)]
pub struct FsDataLoader {
    dir: PathBuf,
}

impl FsDataLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DataLoader for FsDataLoader {
    type Error = CatalogError;

    fn load_document(&self, kind: CatalogKind) -> Result<String, Self::Error> {
        fs::read_to_string(self.dir.join(kind.file_name())).map_err(|source| {
            CatalogError::Missing {
                catalog: kind,
                source,
            }
        })
    }
}

/// One JSON document per save slot plus the cart template, in a single directory.
#[derive(Debug, Clone)]
pub struct FsStorage {
    dir: PathBuf,
}

impl FsStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn save_path(&self, save_name: &str) -> PathBuf {
        self.dir.join(format!("{save_name}.json"))
    }

    #[must_use]
    pub fn cart_path(&self) -> PathBuf {
        self.dir.join(CART_FILE)
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, text)?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

/// Read a document, mapping a missing file to `None`.
fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

impl GameStorage for FsStorage {
    type Error = StorageError;

    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error> {
        let text = serde_json::to_string_pretty(game_state)?;
        self.write(&self.save_path(save_name), &text)
    }

    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error> {
        read_optional(&self.save_path(save_name))?
            .map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(StorageError::from)
    }

    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
        match fs::remove_file(self.save_path(save_name)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    fn save_cart(&self, cart: &Cart) -> Result<(), Self::Error> {
        let text = serde_json::to_string_pretty(cart)?;
        self.write(&self.cart_path(), &text)
    }

    fn load_cart(&self) -> Result<Option<Cart>, Self::Error> {
        read_optional(&self.cart_path())?
            .map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(StorageError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_documents_are_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path());
        assert!(storage.load_game("savegame").unwrap().is_none());
        assert!(storage.load_cart().unwrap().is_none());
        storage.delete_save("savegame").unwrap();
    }

    #[test]
    fn cart_template_is_a_flat_map() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path().join("nested"));
        let cart: Cart = [("tent".to_string(), 1), ("water_bottle".to_string(), 3)]
            .into_iter()
            .collect();
        storage.save_cart(&cart).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(storage.cart_path()).unwrap()).unwrap();
        assert_eq!(raw["water_bottle"], 3);
        assert_eq!(storage.load_cart().unwrap(), Some(cart));
    }

    #[test]
    fn loader_reports_missing_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FsDataLoader::new(dir.path());
        assert!(matches!(
            loader.load_document(CatalogKind::Items),
            Err(CatalogError::Missing {
                catalog: CatalogKind::Items,
                ..
            })
        ));
    }
}
