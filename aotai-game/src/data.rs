//! Static catalog loading and the bundle handed to the controller.
use std::convert::Infallible;
use std::fmt;
use thiserror::Error;

use crate::DataLoader;
use crate::characters::CharacterRoster;
use crate::events::EventCatalog;
use crate::items::ItemCatalog;
use crate::map::MapGraph;
use crate::season::SeasonTable;

/// The five static documents the engine reads at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Items,
    Map,
    Events,
    Characters,
    Seasons,
}

impl CatalogKind {
    pub const ALL: [Self; 5] = [
        Self::Items,
        Self::Map,
        Self::Events,
        Self::Characters,
        Self::Seasons,
    ];

    /// Document name inside a data directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Items => "items.json",
            Self::Map => "map_nodes.json",
            Self::Events => "events.json",
            Self::Characters => "characters.json",
            Self::Seasons => "seasons.json",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Reasons a catalog document could not be used.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog {catalog} is missing: {source}")]
    Missing {
        catalog: CatalogKind,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog {catalog} could not be parsed: {source}")]
    Parse {
        catalog: CatalogKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog {catalog} is invalid: {reason}")]
    Invalid {
        catalog: CatalogKind,
        reason: String,
    },
}

impl CatalogError {
    pub(crate) fn invalid(catalog: CatalogKind, reason: impl Into<String>) -> Self {
        Self::Invalid {
            catalog,
            reason: reason.into(),
        }
    }
}

/// Catalogs compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLoader;

impl DataLoader for EmbeddedLoader {
    type Error = Infallible;

    fn load_document(&self, kind: CatalogKind) -> Result<String, Self::Error> {
        let text = match kind {
            CatalogKind::Items => include_str!("../assets/data/items.json"),
            CatalogKind::Map => include_str!("../assets/data/map_nodes.json"),
            CatalogKind::Events => include_str!("../assets/data/events.json"),
            CatalogKind::Characters => include_str!("../assets/data/characters.json"),
            CatalogKind::Seasons => include_str!("../assets/data/seasons.json"),
        };
        Ok(text.to_string())
    }
}

/// Every read-only table the simulation consults.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub items: ItemCatalog,
    pub map: MapGraph,
    pub events: EventCatalog,
    pub characters: CharacterRoster,
    pub seasons: SeasonTable,
}

impl Catalogs {
    /// Catalogs shipped with the crate.
    #[must_use]
    pub fn default_catalogs() -> Self {
        Self::load(&EmbeddedLoader)
    }

    /// Load every catalog from `loader`, degrading each failure to an empty table.
    #[must_use]
    pub fn load<L: DataLoader>(loader: &L) -> Self {
        Self {
            items: load_one(loader, CatalogKind::Items, ItemCatalog::from_json),
            map: load_one(loader, CatalogKind::Map, MapGraph::from_json),
            events: load_one(loader, CatalogKind::Events, EventCatalog::from_json),
            characters: load_one(loader, CatalogKind::Characters, CharacterRoster::from_json),
            seasons: load_one(loader, CatalogKind::Seasons, SeasonTable::from_json),
        }
    }

    /// Load every catalog, failing on the first missing or invalid one.
    ///
    /// # Errors
    ///
    /// Returns the loader error or the first [`CatalogError`] encountered.
    pub fn try_load<L>(loader: &L) -> Result<Self, anyhow::Error>
    where
        L: DataLoader,
    {
        let items = ItemCatalog::from_json(&loader.load_document(CatalogKind::Items)?)?;
        let map = MapGraph::from_json(&loader.load_document(CatalogKind::Map)?)?;
        let events = EventCatalog::from_json(&loader.load_document(CatalogKind::Events)?)?;
        let characters =
            CharacterRoster::from_json(&loader.load_document(CatalogKind::Characters)?)?;
        let seasons = SeasonTable::from_json(&loader.load_document(CatalogKind::Seasons)?)?;
        Ok(Self {
            items,
            map,
            events,
            characters,
            seasons,
        })
    }
}

fn load_one<L, T, F>(loader: &L, kind: CatalogKind, parse: F) -> T
where
    L: DataLoader,
    T: Default,
    F: FnOnce(&str) -> Result<T, CatalogError>,
{
    let text = match loader.load_document(kind) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("catalog {kind} unavailable, continuing with an empty table: {err}");
            return T::default();
        }
    };
    match parse(&text) {
        Ok(catalog) => catalog,
        Err(err) => {
            log::error!("catalog {kind} rejected, continuing with an empty table: {err}");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapLoader(HashMap<CatalogKind, &'static str>);

    impl DataLoader for MapLoader {
        type Error = CatalogError;

        fn load_document(&self, kind: CatalogKind) -> Result<String, Self::Error> {
            self.0
                .get(&kind)
                .map(|text| (*text).to_string())
                .ok_or_else(|| CatalogError::Missing {
                    catalog: kind,
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
        }
    }

    #[test]
    fn embedded_catalogs_are_populated() {
        let catalogs = Catalogs::try_load(&EmbeddedLoader).unwrap();
        assert!(!catalogs.items.is_empty());
        assert!(catalogs.map.get("start").is_some());
        assert!(!catalogs.events.is_empty());
        assert!(catalogs.characters.get("xiaomou").is_some());
    }

    #[test]
    fn missing_documents_degrade_to_empty() {
        let loader = MapLoader(HashMap::from([(CatalogKind::Items, "[]")]));
        let catalogs = Catalogs::load(&loader);
        assert!(catalogs.items.is_empty());
        assert!(catalogs.map.is_empty());
        assert!(catalogs.events.is_empty());
    }

    #[test]
    fn invalid_document_degrades_but_others_survive() {
        let loader = MapLoader(HashMap::from([
            (
                CatalogKind::Items,
                r#"[{"id":"x","name":"X","weight":1,"price":1,"type":"food","effects":{"warp":1}}]"#,
            ),
            (CatalogKind::Events, "[]"),
        ]));
        let catalogs = Catalogs::load(&loader);
        assert!(catalogs.items.is_empty());
        assert!(catalogs.events.is_empty());
        assert!(Catalogs::try_load(&loader).is_err());
    }
}
