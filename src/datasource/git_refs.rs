//! Git datasources.
//!
//! Both datasources list the refs of a remote repository without cloning
//! it. The dependency name is the repository URL.

use git2::{Direction, ErrorClass, ErrorCode, Remote};

use super::{Datasource, DatasourceError, ExternalHostError, GetReleasesInput};
use crate::core::release::{Release, ReleaseResult};

/// Kind of a remote ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKind {
    Head,
    Branch,
    Tag,
    Other(String),
}

/// A ref advertised by a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRef {
    pub kind: RefKind,
    /// Branch or tag name, or `HEAD`
    pub value: String,
    /// Commit the ref points to
    pub hash: String,
}

/// Parse one advertised ref name.
///
/// Pull-request refs and peeled tag entries (`^{}`) are dropped.
pub fn parse_ref(name: &str, hash: &str) -> Option<RawRef> {
    let (kind, value) = if name == "HEAD" {
        (RefKind::Head, name)
    } else {
        let (kind, value) = name.strip_prefix("refs/")?.split_once('/')?;
        let kind = match kind {
            "heads" => RefKind::Branch,
            "tags" => RefKind::Tag,
            "pull" => return None,
            other => RefKind::Other(other.to_string()),
        };
        (kind, value)
    };

    if value.ends_with("^{}") {
        return None;
    }
    Some(RawRef {
        kind,
        value: value.to_string(),
        hash: hash.to_string(),
    })
}

/// List the refs of `url`.
pub fn ls_remote(url: &str) -> Result<Vec<RawRef>, DatasourceError> {
    let mut remote = Remote::create_detached(url).map_err(|e| classify(url, e))?;
    remote
        .connect(Direction::Fetch)
        .map_err(|e| classify(url, e))?;

    let refs = remote
        .list()
        .map_err(|e| classify(url, e))?
        .iter()
        .filter_map(|head| parse_ref(head.name(), &head.oid().to_string()))
        .collect();

    let _ = remote.disconnect();
    Ok(refs)
}

/// Transport failures mean the host is unavailable. A URL git cannot reach
/// at all, such as a missing local path or an unknown scheme, is an ordinary
/// lookup error like any other.
fn classify(url: &str, err: git2::Error) -> DatasourceError {
    if is_transport_failure(&err) {
        return ExternalHostError::unavailable(url, err.message()).into();
    }
    anyhow::Error::new(err)
        .context(format!("failed to list refs of {}", url))
        .into()
}

fn is_transport_failure(err: &git2::Error) -> bool {
    if matches!(err.code(), ErrorCode::NotFound | ErrorCode::Invalid) {
        return false;
    }
    match err.class() {
        ErrorClass::Http | ErrorClass::Ssl | ErrorClass::Ssh => true,
        ErrorClass::Net => !is_bad_url(err.message()),
        _ => false,
    }
}

/// libgit2 reports unusable URLs under the network class with no more
/// specific code.
fn is_bad_url(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["unsupported url protocol", "invalid url", "malformed url"]
        .iter()
        .any(|needle| message.contains(needle))
}

fn source_url(repo_url: &str) -> String {
    let url = repo_url.strip_suffix('/').unwrap_or(repo_url);
    url.strip_suffix(".git").unwrap_or(url).to_string()
}

fn to_result(repo_url: &str, refs: impl Iterator<Item = RawRef>) -> Option<ReleaseResult> {
    let releases: Vec<Release> = refs
        .map(|r| Release::new(r.value).with_digest(r.hash))
        .collect();
    if releases.is_empty() {
        return None;
    }

    let mut res = ReleaseResult::new(releases).with_source_url(source_url(repo_url));
    res.dedup_versions();
    Some(res)
}

/// Releases from every tag and branch of a repository.
#[derive(Debug, Clone, Default)]
pub struct GitRefsDatasource {
    offline: bool,
}

impl GitRefsDatasource {
    pub const ID: &'static str = "git-refs";

    pub fn new() -> Self {
        Self::default()
    }

    /// Report the host as disabled instead of contacting it.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}

impl Datasource for GitRefsDatasource {
    fn id(&self) -> &str {
        Self::ID
    }

    fn custom_registry_support(&self) -> bool {
        false
    }

    fn get_releases(
        &self,
        input: &GetReleasesInput,
    ) -> Result<Option<ReleaseResult>, DatasourceError> {
        if self.offline {
            return Err(ExternalHostError::disabled(&input.dep_name).into());
        }
        let refs = ls_remote(&input.dep_name)?;
        Ok(to_result(
            &input.dep_name,
            refs.into_iter()
                .filter(|r| matches!(r.kind, RefKind::Branch | RefKind::Tag)),
        ))
    }
}

/// Releases from the tags of a repository.
#[derive(Debug, Clone, Default)]
pub struct GitTagsDatasource {
    offline: bool,
}

impl GitTagsDatasource {
    pub const ID: &'static str = "git-tags";

    pub fn new() -> Self {
        Self::default()
    }

    /// Report the host as disabled instead of contacting it.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}

impl Datasource for GitTagsDatasource {
    fn id(&self) -> &str {
        Self::ID
    }

    fn custom_registry_support(&self) -> bool {
        false
    }

    fn get_releases(
        &self,
        input: &GetReleasesInput,
    ) -> Result<Option<ReleaseResult>, DatasourceError> {
        if self.offline {
            return Err(ExternalHostError::disabled(&input.dep_name).into());
        }
        let refs = ls_remote(&input.dep_name)?;
        Ok(to_result(
            &input.dep_name,
            refs.into_iter().filter(|r| r.kind == RefKind::Tag),
        ))
    }
}
