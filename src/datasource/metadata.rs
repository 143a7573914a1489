//! Post-processing of lookup results.
//!
//! Runs after every successful lookup, whatever the registry strategy:
//! fills in well-known source and changelog URLs, normalizes the source
//! URL, derives missing URLs from each other, drops invalid ones, applies
//! `extract_version` and versioning, and removes duplicate versions.

use std::str::FromStr;

use anyhow::bail;
use regex::Regex;
use url::Url;

use super::GetPkgReleasesConfig;
use crate::core::release::ReleaseResult;

/// Source repositories for packages whose registry metadata lacks one.
const MANUAL_SOURCE_URLS: &[(&str, &str, &str)] = &[
    ("npm", "react-native", "https://github.com/facebook/react-native"),
    ("npm", "node", "https://github.com/nodejs/node"),
    ("node", "node", "https://github.com/nodejs/node"),
];

/// Changelogs that live outside the source repository's releases page.
const MANUAL_CHANGELOG_URLS: &[(&str, &str, &str)] = &[
    (
        "npm",
        "react-native",
        "https://github.com/react-native-community/react-native-releases/blob/master/CHANGELOG.md",
    ),
    ("npm", "firebase", "https://firebase.google.com/support/release-notes/js"),
];

/// How release versions are validated and ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Versioning {
    /// Keep only valid semantic versions (an optional `v` prefix is
    /// allowed), sorted ascending.
    Semver,
    /// Keep every version in registry order.
    Loose,
}

impl FromStr for Versioning {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "semver" => Ok(Versioning::Semver),
            "loose" => Ok(Versioning::Loose),
            other => bail!("unknown versioning `{}` (expected semver or loose)", other),
        }
    }
}

fn parse_semver(version: &str) -> Option<semver::Version> {
    let trimmed = version.trim_start_matches(['v', '=']);
    semver::Version::parse(trimmed).ok()
}

/// Apply all post-processing steps to a lookup result.
pub fn post_process(
    mut res: ReleaseResult,
    datasource: &str,
    dep_name: &str,
    config: &GetPkgReleasesConfig,
) -> ReleaseResult {
    if let Some(url) = manual_url(MANUAL_SOURCE_URLS, datasource, dep_name) {
        res.source_url = Some(url.to_string());
    }
    if let Some(url) = manual_url(MANUAL_CHANGELOG_URLS, datasource, dep_name) {
        res.changelog_url = Some(url.to_string());
    }

    res.source_url = res.source_url.as_deref().map(massage_source_url);
    if res.source_url.is_none() {
        res.source_url = res.changelog_url.as_deref().and_then(source_url_from_changelog);
    }
    if res.changelog_url.is_none() {
        res.changelog_url = res.source_url.as_deref().and_then(changelog_from_source_url);
    }

    res.source_url = res.source_url.filter(|u| is_valid_url(u));
    res.changelog_url = res.changelog_url.filter(|u| is_valid_url(u));
    res.homepage = res.homepage.filter(|u| is_valid_url(u));

    if let Some(pattern) = config.extract_version.as_deref() {
        apply_extract_version(&mut res, pattern);
    }
    if let Some(versioning) = config.versioning {
        apply_versioning(&mut res, versioning);
    }

    res.dedup_versions();
    res
}

fn manual_url(
    table: &[(&str, &str, &'static str)],
    datasource: &str,
    dep_name: &str,
) -> Option<&'static str> {
    table
        .iter()
        .find(|(ds, dep, _)| *ds == datasource && *dep == dep_name)
        .map(|(_, _, url)| *url)
}

/// Normalize a repository URL to `https://host/path`.
///
/// Handles `scm:` prefixes, `git+`/`git://` schemes, scp-style
/// `git@host:owner/repo` forms and a trailing `.git`. GitHub URLs are cut
/// to `owner/repo`, GitLab URLs to the project path.
pub fn massage_source_url(raw: &str) -> String {
    let mut url = raw.trim();
    url = url.strip_prefix("scm:").unwrap_or(url);
    if let Some(rest) = url.strip_prefix("git:") {
        if !rest.starts_with("//") {
            url = rest;
        }
    }
    url = url.strip_prefix("git+").unwrap_or(url);

    let mut url = if let Some(rest) = url.strip_prefix("git@") {
        format!("https://{}", rest.replacen(':', "/", 1))
    } else if let Some(rest) = url.strip_prefix("git://") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("ssh://git@") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://github.com") {
        format!("https://github.com{rest}")
    } else {
        url.to_string()
    };

    if let Some(stripped) = url.strip_suffix(".git") {
        url = stripped.to_string();
    }
    while url.ends_with('/') {
        url.pop();
    }

    match Url::parse(&url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host @ "github.com") => {
                let segments: Vec<_> = path_segments(&parsed).into_iter().take(2).collect();
                format!("https://{host}/{}", segments.join("/"))
            }
            Some(host @ "gitlab.com") => {
                let segments: Vec<_> = path_segments(&parsed)
                    .into_iter()
                    .take_while(|s| *s != "-")
                    .collect();
                format!("https://{host}/{}", segments.join("/"))
            }
            _ => url,
        },
        Err(_) => url,
    }
}

fn path_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// `https://github.com/owner/repo/...` → `https://github.com/owner/repo`.
fn source_url_from_changelog(changelog: &str) -> Option<String> {
    let parsed = Url::parse(changelog).ok()?;
    if parsed.host_str() != Some("github.com") {
        return None;
    }
    let segments = path_segments(&parsed);
    match segments.as_slice() {
        [owner, repo, ..] => Some(format!("https://github.com/{owner}/{repo}")),
        _ => None,
    }
}

fn changelog_from_source_url(source: &str) -> Option<String> {
    let parsed = Url::parse(source).ok()?;
    match parsed.host_str()? {
        "github.com" if path_segments(&parsed).len() == 2 => Some(format!("{source}/releases")),
        "gitlab.com" if path_segments(&parsed).len() >= 2 => Some(format!("{source}/-/releases")),
        _ => None,
    }
}

fn is_valid_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Remap each version through `pattern`'s `version` group, dropping
/// releases that do not match or capture nothing.
fn apply_extract_version(res: &mut ReleaseResult, pattern: &str) {
    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => {
            tracing::warn!("ignoring invalid extractVersion `{}`: {}", pattern, err);
            return;
        }
    };

    res.releases.retain_mut(|release| {
        let Some(version) = regex
            .captures(&release.version)
            .and_then(|caps| caps.name("version"))
            .filter(|m| !m.is_empty())
        else {
            return false;
        };
        let extracted = version.as_str().to_string();
        release.version = extracted;
        true
    });
}

fn apply_versioning(res: &mut ReleaseResult, versioning: Versioning) {
    match versioning {
        Versioning::Loose => {}
        Versioning::Semver => {
            let mut parsed: Vec<_> = res
                .releases
                .drain(..)
                .filter_map(|release| parse_semver(&release.version).map(|v| (v, release)))
                .collect();
            parsed.sort_by(|(a, _), (b, _)| a.cmp(b));
            res.releases = parsed.into_iter().map(|(_, release)| release).collect();
        }
    }
}
