//! Configuration file support for freshen.
//!
//! freshen supports two configuration file locations:
//! - Global: `~/.freshen/config.toml` - User-wide defaults
//! - Project: `.freshen/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.
//!
//! ```toml
//! [migration.preset-renames]
//! "@acme/legacy" = "@acme/base"
//!
//! [net]
//! offline = true
//!
//! [datasource.git-tags]
//! strategy = "merge"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::datasource::{GetPkgReleasesConfig, RegistryStrategy};
use crate::migration::PresetRenames;

/// freshen configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Migration settings
    pub migration: MigrationConfig,

    /// Network settings
    pub net: NetConfig,

    /// Per-datasource overrides, keyed by datasource id
    pub datasource: BTreeMap<String, DatasourceConfig>,
}

/// Migration-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MigrationConfig {
    /// Preset references to rewrite in `extends`; an empty target removes
    /// the reference
    pub preset_renames: BTreeMap<String, String>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Offline mode (don't contact registries)
    pub offline: bool,
}

/// Overrides for one datasource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DatasourceConfig {
    /// Registries queried instead of the datasource defaults
    pub registry_urls: Vec<String>,

    /// Strategy used instead of the datasource's own
    pub strategy: Option<RegistryStrategy>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.migration
            .preset_renames
            .extend(other.migration.preset_renames);

        if other.net.offline {
            self.net.offline = true;
        }

        for (id, overrides) in other.datasource {
            let entry = self.datasource.entry(id).or_default();
            if !overrides.registry_urls.is_empty() {
                entry.registry_urls = overrides.registry_urls;
            }
            if overrides.strategy.is_some() {
                entry.strategy = overrides.strategy;
            }
        }
    }

    /// Preset renames for the migration engine.
    pub fn preset_renames(&self) -> PresetRenames {
        self.migration.preset_renames.clone().into_iter().collect()
    }

    /// Fill in registry URLs and strategy the request leaves unset.
    pub fn apply_datasource_overrides(&self, request: &mut GetPkgReleasesConfig) {
        let Some(overrides) = request
            .datasource
            .as_deref()
            .and_then(|id| self.datasource.get(id))
        else {
            return;
        };

        if request.registry_urls.is_empty() {
            request.registry_urls = overrides.registry_urls.clone();
        }
        if request.strategy.is_none() {
            request.strategy = overrides.strategy;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.freshen/config.toml)
/// 2. Global config (~/.freshen/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    // Project config overrides global
    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global freshen config directory (~/.freshen).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".freshen"))
}

/// Get the project config path (.freshen/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".freshen").join("config.toml")
}
