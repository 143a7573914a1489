//! Implementation of `freshen releases`.

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};

use crate::core::release::ReleaseResult;
use crate::datasource::{DatasourceRegistry, GetPkgReleasesConfig, RegistryStrategy, Versioning};
use crate::util::diagnostic::suggestions;
use crate::util::GlobalContext;

/// Options for a release lookup.
#[derive(Debug, Clone, Default)]
pub struct ReleasesOptions {
    pub datasource: String,
    pub dep_name: String,
    /// Registries to query instead of the configured or default ones
    pub registry_urls: Vec<String>,
    pub strategy: Option<RegistryStrategy>,
    pub extract_version: Option<String>,
    pub versioning: Option<Versioning>,
}

/// Look up the releases of one dependency.
///
/// `Ok(None)` means no registry knows the dependency.
pub fn lookup_releases(
    ctx: &GlobalContext,
    registry: &DatasourceRegistry,
    opts: &ReleasesOptions,
) -> Result<Option<ReleaseResult>> {
    if registry.get(&opts.datasource).is_none() {
        let known: Vec<_> = registry.ids().collect();
        bail!(
            "unknown datasource `{}` (known: {})\n{}",
            opts.datasource,
            known.join(", "),
            suggestions::UNKNOWN_DATASOURCE
        );
    }

    let mut request = GetPkgReleasesConfig::new(&opts.datasource, &opts.dep_name)
        .with_registry_urls(opts.registry_urls.iter().cloned());
    request.strategy = opts.strategy;
    request.extract_version = opts.extract_version.clone();
    request.versioning = opts.versioning;
    ctx.config().apply_datasource_overrides(&mut request);

    registry.get_pkg_releases(&request).with_context(|| {
        format!(
            "failed to look up `{}` with datasource `{}`\n{}",
            opts.dep_name,
            opts.datasource,
            suggestions::LOOKUP_FAILED
        )
    })
}

/// Human-readable listing of a lookup result.
pub fn format_releases(res: &ReleaseResult) -> String {
    let mut out = String::new();
    for release in &res.releases {
        match &release.new_digest {
            Some(digest) => {
                let _ = writeln!(out, "{} ({})", release.version, short_digest(digest));
            }
            None => {
                let _ = writeln!(out, "{}", release.version);
            }
        }
    }

    let urls = [
        ("source", &res.source_url),
        ("changelog", &res.changelog_url),
        ("homepage", &res.homepage),
        ("registry", &res.registry_url),
    ];
    for (label, url) in urls {
        if let Some(url) = url {
            let _ = writeln!(out, "{label}: {url}");
        }
    }
    out
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}
