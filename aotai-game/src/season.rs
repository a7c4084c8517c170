//! Seasons and their baseline temperatures.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::data::{CatalogError, CatalogKind};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Self; 4] = [Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }

    /// Baseline used when the season table does not define one.
    #[must_use]
    pub const fn fallback_base_temp(self) -> f64 {
        match self {
            Self::Spring => 10.0,
            Self::Summer => 18.0,
            Self::Autumn => 8.0,
            Self::Winter => -5.0,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "autumn" | "fall" => Ok(Self::Autumn),
            "winter" => Ok(Self::Winter),
            other => Err(format!("unknown season `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_temp: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonTable(BTreeMap<Season, SeasonDef>);

impl SeasonTable {
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] when the document is not a season map.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            catalog: CatalogKind::Seasons,
            source,
        })
    }

    #[must_use]
    pub fn get(&self, season: Season) -> Option<&SeasonDef> {
        self.0.get(&season)
    }

    #[must_use]
    pub fn base_temp(&self, season: Season) -> f64 {
        self.get(season)
            .map_or_else(|| season.fallback_base_temp(), |def| def.base_temp)
    }
}
