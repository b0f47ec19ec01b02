//! Content factory for building collaborators from a data directory.

use std::path::{Path, PathBuf};

use encounter_core::CombatConfig;

use crate::catalog::ContentCatalog;
use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult};

/// Content factory that loads all encounter content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── catalog.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "config.toml";
    pub const CATALOG_FILE: &'static str = "catalog.ron";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        ConfigLoader::load(&self.data_dir.join(Self::CONFIG_FILE))
    }

    /// Load the weapon/enemy catalog from `catalog.ron`.
    pub fn load_catalog(&self) -> LoadResult<ContentCatalog> {
        CatalogLoader::load(&self.data_dir.join(Self::CATALOG_FILE))
    }

    /// Loads both files; a missing file yields its default, a malformed one
    /// is still an error.
    pub fn load_or_default(&self) -> LoadResult<(CombatConfig, ContentCatalog)> {
        let config = if self.data_dir.join(Self::CONFIG_FILE).exists() {
            self.load_config()?
        } else {
            tracing::info!(
                target: "content::factory",
                dir = %self.data_dir.display(),
                "no config.toml, using default combat config"
            );
            CombatConfig::default()
        };
        let catalog = if self.data_dir.join(Self::CATALOG_FILE).exists() {
            self.load_catalog()?
        } else {
            tracing::info!(
                target: "content::factory",
                dir = %self.data_dir.display(),
                "no catalog.ron, every combatant fights unarmed"
            );
            ContentCatalog::default()
        };
        Ok((config, catalog))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
