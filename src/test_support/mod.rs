//! Test utilities and mocks for freshen unit tests.
//!
//! This module provides a scripted [`Datasource`] so registry strategies
//! can be tested without a network, plus a helper that captures the log
//! output of a closure.
//!
//! # Example
//!
//! ```rust,ignore
//! use freshen::test_support::{MockDatasource, MockResponse};
//!
//! #[test]
//! fn test_example() {
//!     let mock = MockDatasource::new("npm")
//!         .respond("https://reg1.example", MockResponse::NotFound)
//!         .respond("https://reg2.example", MockResponse::versions(["1.0.0"]));
//!
//!     // Look up releases through `mock`, then inspect `mock.calls()`...
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::core::release::ReleaseResult;
use crate::datasource::{
    Datasource, DatasourceError, ExternalHostError, GetReleasesInput, RegistryStrategy,
};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Scripted answer of a [`MockDatasource`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return these releases
    Found(ReleaseResult),
    /// The registry does not know the dependency
    NotFound,
    /// The host is disabled by configuration
    HostDisabled,
    /// The host could not be reached
    HostUnavailable,
    /// Any other lookup failure
    Error(String),
}

impl MockResponse {
    /// A result listing `versions` and nothing else.
    pub fn versions<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Found(ReleaseResult::from_versions(versions))
    }
}

/// A datasource answering from a script, recording every query.
///
/// Registries without a scripted response fall back to the default
/// response, or [`MockResponse::NotFound`] when there is none.
#[derive(Debug)]
pub struct MockDatasource {
    id: String,
    custom_registries: bool,
    default_registries: Vec<String>,
    strategy: Option<RegistryStrategy>,
    responses: HashMap<String, MockResponse>,
    default_response: Option<MockResponse>,
    calls: Mutex<Vec<Option<String>>>,
}

impl MockDatasource {
    /// Create a datasource that knows nothing.
    pub fn new(id: impl Into<String>) -> Self {
        MockDatasource {
            id: id.into(),
            custom_registries: true,
            default_registries: Vec::new(),
            strategy: None,
            responses: HashMap::new(),
            default_response: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Ignore configured registry URLs.
    pub fn without_custom_registries(mut self) -> Self {
        self.custom_registries = false;
        self
    }

    pub fn with_default_registries<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_registries = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strategy(mut self, strategy: RegistryStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Script the answer for one registry.
    pub fn respond(mut self, registry_url: impl Into<String>, response: MockResponse) -> Self {
        self.responses.insert(registry_url.into(), response);
        self
    }

    /// Script the answer for queries without a registry and for registries
    /// that have no answer of their own.
    pub fn respond_default(mut self, response: MockResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Registries queried so far, in call order.
    pub fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Datasource for MockDatasource {
    fn id(&self) -> &str {
        &self.id
    }

    fn default_registry_urls(&self) -> Vec<String> {
        self.default_registries.clone()
    }

    fn custom_registry_support(&self) -> bool {
        self.custom_registries
    }

    fn registry_strategy(&self) -> Option<RegistryStrategy> {
        self.strategy
    }

    fn get_releases(
        &self,
        input: &GetReleasesInput,
    ) -> Result<Option<ReleaseResult>, DatasourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(input.registry_url.clone());
        }

        let response = input
            .registry_url
            .as_deref()
            .and_then(|url| self.responses.get(url))
            .or(self.default_response.as_ref())
            .cloned()
            .unwrap_or(MockResponse::NotFound);

        let host = input.registry_url.as_deref().unwrap_or(&input.dep_name);
        match response {
            MockResponse::Found(res) => Ok(Some(res)),
            MockResponse::NotFound => Ok(None),
            MockResponse::HostDisabled => Err(ExternalHostError::disabled(host).into()),
            MockResponse::HostUnavailable => {
                Err(ExternalHostError::unavailable(host, "connection refused").into())
            }
            MockResponse::Error(message) => Err(anyhow::anyhow!(message).into()),
        }
    }
}

/// Shared in-memory log sink.
#[derive(Debug, Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut inner) = self.0.lock() {
            inner.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a subscriber that records every event on this thread at
/// `DEBUG` and above. Returns `f`'s result and the formatted log text.
pub fn capture_logs<F, R>(f: F) -> (R, String)
where
    F: FnOnce() -> R,
{
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = buffer
        .0
        .lock()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();
    (result, logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_datasource_records_calls() {
        let mock = MockDatasource::new("npm")
            .respond("https://a.example", MockResponse::versions(["1.0.0"]));

        let found = mock
            .get_releases(&GetReleasesInput {
                dep_name: "x".into(),
                registry_url: Some("https://a.example".into()),
            })
            .unwrap();
        let missing = mock
            .get_releases(&GetReleasesInput {
                dep_name: "x".into(),
                registry_url: None,
            })
            .unwrap();

        assert!(found.is_some());
        assert!(missing.is_none());
        assert_eq!(mock.calls(), vec![Some("https://a.example".to_string()), None]);
    }

    #[test]
    fn test_mock_host_errors_are_classified() {
        let mock = MockDatasource::new("npm").respond_default(MockResponse::HostDisabled);
        let err = mock
            .get_releases(&GetReleasesInput {
                dep_name: "x".into(),
                registry_url: None,
            })
            .unwrap_err();
        assert!(err.as_external_host().unwrap().is_disabled());
    }

    #[test]
    fn test_capture_logs() {
        let (value, logs) = capture_logs(|| {
            tracing::warn!("something happened");
            42
        });
        assert_eq!(value, 42);
        assert!(logs.contains("something happened"));
        assert!(logs.contains("WARN"));
    }
}
