//! Multi-registry lookup strategies.

use rayon::prelude::*;

use super::{Datasource, DatasourceError, ExternalHostError, GetReleasesInput, RegistryStrategy};
use crate::core::release::ReleaseResult;

/// Query `registry_urls` for `dep_name` and combine the answers.
///
/// Host-disabled and ordinary errors never escape: the registry simply
/// contributes nothing. A failing external host aborts the whole lookup.
/// With no registry URLs the datasource is queried once without one.
pub fn resolve_package_releases(
    datasource: &dyn Datasource,
    dep_name: &str,
    registry_urls: &[String],
    strategy: RegistryStrategy,
) -> Result<Option<ReleaseResult>, ExternalHostError> {
    if registry_urls.is_empty() {
        return query_registry(datasource, dep_name, None);
    }

    match strategy {
        RegistryStrategy::First => {
            if registry_urls.len() > 1 {
                tracing::warn!(
                    datasource = datasource.id(),
                    dep = dep_name,
                    "registry strategy `first` only uses the first registry that answers; {} are configured",
                    registry_urls.len()
                );
            }
            hunt(datasource, dep_name, registry_urls)
        }
        RegistryStrategy::Hunt => hunt(datasource, dep_name, registry_urls),
        RegistryStrategy::Merge => merge(datasource, dep_name, registry_urls),
    }
}

/// Query registries in order, stopping at the first answer.
fn hunt(
    datasource: &dyn Datasource,
    dep_name: &str,
    registry_urls: &[String],
) -> Result<Option<ReleaseResult>, ExternalHostError> {
    for url in registry_urls {
        if let Some(res) = query_registry(datasource, dep_name, Some(url))? {
            return Ok(Some(res));
        }
    }
    Ok(None)
}

/// Query every registry concurrently and union the releases in URL order.
fn merge(
    datasource: &dyn Datasource,
    dep_name: &str,
    registry_urls: &[String],
) -> Result<Option<ReleaseResult>, ExternalHostError> {
    let answers = registry_urls
        .par_iter()
        .map(|url| query_registry(datasource, dep_name, Some(url)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut merged: Option<ReleaseResult> = None;
    for res in answers.into_iter().flatten() {
        match merged.as_mut() {
            None => merged = Some(res),
            Some(acc) => {
                acc.releases.extend(res.releases);
                acc.source_url = acc.source_url.take().or(res.source_url);
                acc.changelog_url = acc.changelog_url.take().or(res.changelog_url);
                acc.homepage = acc.homepage.take().or(res.homepage);
            }
        }
    }

    Ok(merged.map(|mut res| {
        res.dedup_versions();
        res
    }))
}

/// Query one registry, classifying failures.
fn query_registry(
    datasource: &dyn Datasource,
    dep_name: &str,
    registry_url: Option<&str>,
) -> Result<Option<ReleaseResult>, ExternalHostError> {
    let input = GetReleasesInput {
        dep_name: dep_name.to_string(),
        registry_url: registry_url.map(str::to_string),
    };

    match datasource.get_releases(&input) {
        Ok(Some(mut res)) if !res.releases.is_empty() => {
            if res.registry_url.is_none() {
                res.registry_url = input.registry_url;
            }
            Ok(Some(res))
        }
        Ok(_) => Ok(None),
        Err(DatasourceError::ExternalHost(err)) if err.is_disabled() => {
            tracing::debug!(registry = ?registry_url, "host disabled, skipping registry");
            Ok(None)
        }
        Err(DatasourceError::ExternalHost(err)) => Err(err),
        Err(DatasourceError::Other(err)) => {
            tracing::debug!(registry = ?registry_url, "registry lookup failed: {:#}", err);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::HostErrorKind;
    use crate::test_support::{capture_logs, MockDatasource, MockResponse};

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_first_warns_once_for_multiple_registries() {
        let mock = MockDatasource::new("docker");
        let registries = urls(&["https://docker.com", "https://docker.io"]);

        let (res, logs) = capture_logs(|| {
            resolve_package_releases(&mock, "something", &registries, RegistryStrategy::First)
        });

        assert_eq!(res.unwrap(), None);
        assert_eq!(logs.matches("registry strategy `first`").count(), 1);
        assert_eq!(mock.calls().len(), 2);
    }

    #[test]
    fn test_first_single_registry_does_not_warn() {
        let mock = MockDatasource::new("docker");
        let registries = urls(&["https://docker.io"]);
        let (_, logs) = capture_logs(|| {
            resolve_package_releases(&mock, "x", &registries, RegistryStrategy::First)
        });
        assert!(!logs.contains("registry strategy"));
    }

    #[test]
    fn test_first_stops_at_first_registry_answer() {
        let mock = MockDatasource::new("docker")
            .respond("https://docker.com", MockResponse::versions(["1.0.0"]))
            .respond("https://docker.io", MockResponse::versions(["2.0.0"]));
        let registries = urls(&["https://docker.com", "https://docker.io"]);

        let (res, logs) = capture_logs(|| {
            resolve_package_releases(&mock, "something", &registries, RegistryStrategy::First)
        });

        let res = res.unwrap().unwrap();
        assert_eq!(res.versions(), vec!["1.0.0"]);
        assert_eq!(logs.matches("registry strategy `first`").count(), 1);
        assert_eq!(mock.calls(), vec![Some("https://docker.com".to_string())]);
    }

    #[test]
    fn test_first_uses_second_registry_when_first_misses() {
        let mock = MockDatasource::new("docker")
            .respond("https://docker.com", MockResponse::NotFound)
            .respond("https://docker.io", MockResponse::versions(["2.0.0"]))
            .respond("https://quay.io", MockResponse::versions(["3.0.0"]));
        let registries = urls(&["https://docker.com", "https://docker.io", "https://quay.io"]);

        let (res, logs) = capture_logs(|| {
            resolve_package_releases(&mock, "something", &registries, RegistryStrategy::First)
        });

        let res = res.unwrap().unwrap();
        assert_eq!(res.versions(), vec!["2.0.0"]);
        assert_eq!(res.registry_url.as_deref(), Some("https://docker.io"));
        assert_eq!(logs.matches("registry strategy `first`").count(), 1);
        assert_eq!(mock.calls().len(), 2);
    }

    #[test]
    fn test_hunt_returns_second_registry_result() {
        let mock = MockDatasource::new("packagist")
            .respond("https://reg1.com", MockResponse::NotFound)
            .respond("https://reg2.io", MockResponse::versions(["1.0.0"]));

        let res = resolve_package_releases(
            &mock,
            "something",
            &urls(&["https://reg1.com", "https://reg2.io"]),
            RegistryStrategy::Hunt,
        )
        .unwrap()
        .unwrap();

        assert_eq!(res.versions(), vec!["1.0.0"]);
        assert_eq!(res.registry_url.as_deref(), Some("https://reg2.io"));
    }

    #[test]
    fn test_hunt_stops_at_first_answer() {
        let mock = MockDatasource::new("packagist")
            .respond("https://reg1.com", MockResponse::versions(["1.0.0"]))
            .respond("https://reg2.io", MockResponse::versions(["2.0.0"]));

        resolve_package_releases(
            &mock,
            "something",
            &urls(&["https://reg1.com", "https://reg2.io"]),
            RegistryStrategy::Hunt,
        )
        .unwrap();
        assert_eq!(mock.calls(), vec![Some("https://reg1.com".to_string())]);
    }

    #[test]
    fn test_host_disabled_returns_none() {
        let mock = MockDatasource::new("packagist")
            .respond("https://reg1.com", MockResponse::HostDisabled);
        let res = resolve_package_releases(
            &mock,
            "something",
            &urls(&["https://reg1.com"]),
            RegistryStrategy::Hunt,
        );
        assert_eq!(res.unwrap(), None);
    }

    #[test]
    fn test_hunt_aborts_on_external_host_error() {
        let mock = MockDatasource::new("packagist")
            .respond("https://reg1.com", MockResponse::HostUnavailable)
            .respond("https://reg2.io", MockResponse::versions(["1.0.0"]));

        let err = resolve_package_releases(
            &mock,
            "something",
            &urls(&["https://reg1.com", "https://reg2.io"]),
            RegistryStrategy::Hunt,
        )
        .unwrap_err();

        assert_eq!(err.kind, HostErrorKind::Unavailable);
        assert_eq!(mock.calls().len(), 1);
    }

    #[test]
    fn test_hunt_all_errors_returns_none() {
        let mock = MockDatasource::new("packagist")
            .respond("https://reg1.com", MockResponse::Error("a".into()))
            .respond("https://reg2.io", MockResponse::Error("b".into()));
        let res = resolve_package_releases(
            &mock,
            "something",
            &urls(&["https://reg1.com", "https://reg2.io"]),
            RegistryStrategy::Hunt,
        );
        assert_eq!(res.unwrap(), None);
    }

    #[test]
    fn test_merge_unions_releases() {
        let mock = MockDatasource::new("maven")
            .respond("https://reg1.com", MockResponse::versions(["1.0.0", "1.1.0"]))
            .respond("https://reg2.io", MockResponse::versions(["1.0.0"]));

        let res = resolve_package_releases(
            &mock,
            "something",
            &urls(&["https://reg1.com", "https://reg2.io"]),
            RegistryStrategy::Merge,
        )
        .unwrap()
        .unwrap();

        assert_eq!(res.versions(), vec!["1.0.0", "1.1.0"]);
        assert_eq!(res.registry_url.as_deref(), Some("https://reg1.com"));
    }

    #[test]
    fn test_merge_earlier_registry_metadata_wins() {
        let mock = MockDatasource::new("maven")
            .respond(
                "https://reg1.com",
                MockResponse::Found(ReleaseResult::from_versions(["1.0.0"])),
            )
            .respond(
                "https://reg2.io",
                MockResponse::Found(
                    ReleaseResult::from_versions(["2.0.0"]).with_source_url("https://github.com/a/b"),
                ),
            );

        let res = resolve_package_releases(
            &mock,
            "something",
            &urls(&["https://reg1.com", "https://reg2.io"]),
            RegistryStrategy::Merge,
        )
        .unwrap()
        .unwrap();

        // first registry had no source URL, so the second one fills it in
        assert_eq!(res.source_url.as_deref(), Some("https://github.com/a/b"));
        assert_eq!(res.versions(), vec!["1.0.0", "2.0.0"]);
    }

    #[test]
    fn test_merge_aborts_on_external_host_error() {
        let mock = MockDatasource::new("maven")
            .respond("https://reg1.com", MockResponse::HostUnavailable)
            .respond("https://reg2.io", MockResponse::versions(["1.0.0"]));

        let res = resolve_package_releases(
            &mock,
            "something",
            &urls(&["https://reg1.com", "https://reg2.io"]),
            RegistryStrategy::Merge,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_merge_all_errors_returns_none() {
        let mock = MockDatasource::new("maven")
            .respond("https://reg1.com", MockResponse::Error("a".into()))
            .respond("https://reg2.io", MockResponse::HostDisabled);

        let res = resolve_package_releases(
            &mock,
            "something",
            &urls(&["https://reg1.com", "https://reg2.io"]),
            RegistryStrategy::Merge,
        );
        assert_eq!(res.unwrap(), None);
    }

    #[test]
    fn test_no_registries_queries_once() {
        let mock = MockDatasource::new("git-tags").respond_default(MockResponse::versions(["v1"]));
        let res = resolve_package_releases(&mock, "https://example.com/repo.git", &[], RegistryStrategy::Merge)
            .unwrap()
            .unwrap();

        assert_eq!(res.versions(), vec!["v1"]);
        assert_eq!(mock.calls(), vec![None]);
    }

    #[test]
    fn test_empty_release_list_is_none() {
        let mock = MockDatasource::new("npm")
            .respond("https://reg1.com", MockResponse::Found(ReleaseResult::default()));
        let res = resolve_package_releases(&mock, "x", &urls(&["https://reg1.com"]), RegistryStrategy::Hunt);
        assert_eq!(res.unwrap(), None);
    }
}
