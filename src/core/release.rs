//! Release lists returned by datasources.

use serde::{Deserialize, Serialize};

/// One published version of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Version identifier as published by the registry
    pub version: String,

    /// Publication timestamp (RFC 3339), when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_timestamp: Option<String>,

    /// Per-release changelog link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog_url: Option<String>,

    /// Commit hash or content digest for the release
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_digest: Option<String>,

    /// Whether the registry flags this release as deprecated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deprecated: Option<bool>,
}

impl Release {
    /// Create a release with only a version.
    pub fn new(version: impl Into<String>) -> Self {
        Release {
            version: version.into(),
            ..Default::default()
        }
    }

    /// Attach a digest.
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.new_digest = Some(digest.into());
        self
    }
}

/// The releases of one dependency, plus dependency-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResult {
    pub releases: Vec<Release>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// Registry the result came from (first contributing registry on merge)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,
}

impl ReleaseResult {
    /// Create a result from a list of releases.
    pub fn new(releases: Vec<Release>) -> Self {
        ReleaseResult {
            releases,
            ..Default::default()
        }
    }

    /// Create a result from bare version strings.
    pub fn from_versions<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(versions.into_iter().map(Release::new).collect())
    }

    /// Set the source repository URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Version identifiers in order.
    pub fn versions(&self) -> Vec<&str> {
        self.releases.iter().map(|r| r.version.as_str()).collect()
    }

    /// Drop releases whose version was already seen, keeping the first.
    pub fn dedup_versions(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.releases.retain(|r| seen.insert(r.version.clone()));
    }
}
