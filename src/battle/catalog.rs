//! Concept catalog for AI attack selection
//!
//! Maps display names to opaque visual asset identifiers. The orchestrator only
//! needs a random name; an empty catalog falls back to a built-in list.

use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::core::error::{ArenaError, Result};

/// Names used when no catalog entries are available
pub const FALLBACK_CONCEPTS: [&str; 8] = [
    "Fire",
    "Water",
    "Wolf",
    "Rock",
    "Lightning",
    "Ice",
    "Wind",
    "Dragon",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub asset: String,
    /// Extra yaw applied by the visual layer, radians
    #[serde(default)]
    pub rotation_offset: f32,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "concept")]
    concepts: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct ConceptCatalog {
    entries: Vec<CatalogEntry>,
}

impl ConceptCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        if let Some(bad) = file.concepts.iter().find(|e| e.name.trim().is_empty()) {
            return Err(ArenaError::Config(format!(
                "Catalog entry with asset '{}' has an empty name",
                bad.asset
            )));
        }
        Ok(Self::new(file.concepts))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::info!("Loaded {} concepts from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Uniform pick over the catalog, or over `FALLBACK_CONCEPTS` when empty
    pub fn pick_random_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self.entries.choose(rng) {
            Some(entry) => entry.name.clone(),
            None => FALLBACK_CONCEPTS
                .choose(rng)
                .copied()
                .unwrap_or("Fire")
                .to_string(),
        }
    }

    /// Case-insensitive asset lookup
    pub fn asset_for(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name.to_lowercase() == wanted)
            .map(|e| e.asset.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
