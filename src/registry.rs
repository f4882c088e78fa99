//! Allow-list of recognized tokens.
//!
//! Loaded once from a JSON file at startup and shared read-only afterwards.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigLoadError;
use crate::models::AssetInfo;

#[derive(Debug, Deserialize)]
struct AllowListFile {
    #[serde(alias = "bluechip_tokens")]
    tokens: HashMap<String, AssetInfo>,
}

/// Read-only mapping from mint address to [`AssetInfo`].
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    entries: HashMap<String, AssetInfo>,
}

impl AssetRegistry {
    /// Price-lookup keys are trimmed here, matching what is sent to the
    /// quote service.
    pub fn new(mut entries: HashMap<String, AssetInfo>) -> Self {
        for info in entries.values_mut() {
            let trimmed = info.price_lookup_key.trim();
            if trimmed.len() != info.price_lookup_key.len() {
                info.price_lookup_key = trimmed.to_string();
            }
        }
        Self { entries }
    }

    /// Load the allow-list file.
    ///
    /// Expects `{"tokens": {"<mint>": {...}}}`; the older `bluechip_tokens`
    /// key is accepted too.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let registry = Self::from_json(&content).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            path = %path.display(),
            tokens = registry.len(),
            "loaded asset allow-list"
        );
        Ok(registry)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let file: AllowListFile = serde_json::from_str(content)?;
        Ok(Self::new(file.tokens))
    }

    pub fn lookup(&self, asset_identifier: &str) -> Option<&AssetInfo> {
        self.entries.get(asset_identifier)
    }

    pub fn contains(&self, asset_identifier: &str) -> bool {
        self.entries.contains_key(asset_identifier)
    }

    pub fn all_entries(&self) -> &HashMap<String, AssetInfo> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
