//! Release lookup across registries.
//!
//! A [`Datasource`] knows how to list the releases of one dependency from
//! one registry. The [`DatasourceRegistry`] maps datasource ids to
//! implementations and runs a lookup against every configured registry URL,
//! combining the answers according to a [`RegistryStrategy`]:
//!
//! - `first`: query registries in order and stop at the first answer
//! - `hunt`: like `first`, without complaining about extra registries
//! - `merge`: query every registry concurrently and union the releases
//!
//! Results are post-processed the same way whatever the strategy (source
//! URL cleanup, changelog derivation, version extraction, de-duplication).

pub mod errors;
pub mod git_refs;
pub mod metadata;
mod strategy;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::core::release::ReleaseResult;

pub use errors::{DatasourceError, ExternalHostError, HostErrorKind};
pub use git_refs::{GitRefsDatasource, GitTagsDatasource};
pub use metadata::Versioning;
pub use strategy::resolve_package_releases;

/// Input to a single-registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetReleasesInput {
    /// Name of the dependency as the registry knows it
    pub dep_name: String,
    /// Registry to query; `None` for datasources without registries
    pub registry_url: Option<String>,
}

/// A source of release information.
///
/// Implementations classify their failures: configuration-disabled or
/// unreachable hosts are reported as [`ExternalHostError`], anything else
/// as [`DatasourceError::Other`].
pub trait Datasource: Send + Sync {
    /// Identifier used in configuration (`git-tags`, `npm`, ...).
    fn id(&self) -> &str;

    /// Registries queried when none are configured.
    fn default_registry_urls(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether configured registry URLs are honoured.
    fn custom_registry_support(&self) -> bool {
        true
    }

    /// Preferred multi-registry strategy.
    fn registry_strategy(&self) -> Option<RegistryStrategy> {
        None
    }

    /// List releases from one registry. `Ok(None)` means the dependency is
    /// unknown there.
    fn get_releases(
        &self,
        input: &GetReleasesInput,
    ) -> Result<Option<ReleaseResult>, DatasourceError>;
}

/// How answers from several registries are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryStrategy {
    First,
    #[default]
    Hunt,
    Merge,
}

impl FromStr for RegistryStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "first" => Ok(RegistryStrategy::First),
            "hunt" => Ok(RegistryStrategy::Hunt),
            "merge" => Ok(RegistryStrategy::Merge),
            other => bail!("unknown registry strategy `{}` (expected first, hunt or merge)", other),
        }
    }
}

impl fmt::Display for RegistryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryStrategy::First => write!(f, "first"),
            RegistryStrategy::Hunt => write!(f, "hunt"),
            RegistryStrategy::Merge => write!(f, "merge"),
        }
    }
}

/// A release lookup request.
#[derive(Debug, Clone, Default)]
pub struct GetPkgReleasesConfig {
    pub datasource: Option<String>,
    pub dep_name: Option<String>,
    /// Configured registries, highest priority first
    pub registry_urls: Vec<String>,
    /// Registries queried after the configured or default ones
    pub additional_registry_urls: Vec<String>,
    /// Overrides the datasource's own strategy
    pub strategy: Option<RegistryStrategy>,
    /// Regex with a named `version` group applied to every release
    pub extract_version: Option<String>,
    pub versioning: Option<Versioning>,
}

impl GetPkgReleasesConfig {
    pub fn new(datasource: impl Into<String>, dep_name: impl Into<String>) -> Self {
        GetPkgReleasesConfig {
            datasource: Some(datasource.into()),
            dep_name: Some(dep_name.into()),
            ..Default::default()
        }
    }

    pub fn with_registry_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strategy(mut self, strategy: RegistryStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_extract_version(mut self, pattern: impl Into<String>) -> Self {
        self.extract_version = Some(pattern.into());
        self
    }

    pub fn with_versioning(mut self, versioning: Versioning) -> Self {
        self.versioning = Some(versioning);
        self
    }
}

/// Datasources by id.
#[derive(Default, Clone)]
pub struct DatasourceRegistry {
    datasources: BTreeMap<String, Arc<dyn Datasource>>,
}

impl DatasourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in datasources.
    pub fn with_defaults(offline: bool) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GitRefsDatasource::new().offline(offline)));
        registry.register(Arc::new(GitTagsDatasource::new().offline(offline)));
        registry
    }

    /// Add a datasource, replacing any with the same id.
    pub fn register(&mut self, datasource: Arc<dyn Datasource>) {
        self.datasources
            .insert(datasource.id().to_string(), datasource);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Datasource>> {
        self.datasources.get(id).cloned()
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.datasources.keys().map(String::as_str)
    }

    /// Look up the releases of one dependency.
    ///
    /// Returns `Ok(None)` when the request names no datasource or
    /// dependency, when the datasource is unknown, or when no registry knows
    /// the dependency. Only a failing external host is an error.
    pub fn get_pkg_releases(
        &self,
        config: &GetPkgReleasesConfig,
    ) -> Result<Option<ReleaseResult>, ExternalHostError> {
        let Some(id) = config.datasource.as_deref() else {
            tracing::debug!("no datasource configured");
            return Ok(None);
        };
        let Some(dep_name) = config.dep_name.as_deref().filter(|d| !d.is_empty()) else {
            tracing::debug!(datasource = id, "no dependency name");
            return Ok(None);
        };
        let Some(datasource) = self.get(id) else {
            tracing::warn!("unknown datasource `{}`", id);
            return Ok(None);
        };

        let registry_urls = resolve_registry_urls(datasource.as_ref(), config);
        let strategy = config
            .strategy
            .or_else(|| datasource.registry_strategy())
            .unwrap_or_default();
        tracing::debug!(
            datasource = id,
            dep = dep_name,
            %strategy,
            registries = registry_urls.len(),
            "looking up releases"
        );

        let result =
            resolve_package_releases(datasource.as_ref(), dep_name, &registry_urls, strategy)?;
        Ok(result.map(|res| metadata::post_process(res, id, dep_name, config)))
    }
}

impl fmt::Debug for DatasourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasourceRegistry")
            .field("datasources", &self.datasources.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry URLs to query, highest priority first.
fn resolve_registry_urls(datasource: &dyn Datasource, config: &GetPkgReleasesConfig) -> Vec<String> {
    let defaults = datasource.default_registry_urls();

    if !datasource.custom_registry_support() {
        if !config.registry_urls.is_empty() || !config.additional_registry_urls.is_empty() {
            tracing::warn!(
                "custom registries are not supported by datasource `{}` and will be ignored",
                datasource.id()
            );
        }
        return defaults;
    }

    let mut urls = if config.registry_urls.is_empty() {
        defaults
    } else {
        config.registry_urls.clone()
    };
    urls.extend(config.additional_registry_urls.iter().cloned());

    let mut seen = std::collections::HashSet::new();
    urls.retain(|url| seen.insert(url.clone()));
    urls
}
