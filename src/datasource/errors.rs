//! Datasource error types.

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// How an external host failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostErrorKind {
    /// The host is disabled by configuration (offline mode, host rules).
    /// Lookups move on to the next registry.
    Disabled,
    /// The host could not be reached or answered with a server error.
    /// Lookups abort.
    Unavailable,
}

/// Failure of an upstream host, classified at the datasource boundary.
#[derive(Debug, Clone, Error)]
#[error("{host}: {message}")]
pub struct ExternalHostError {
    pub kind: HostErrorKind,
    /// Host or registry URL that failed
    pub host: String,
    pub message: String,
}

impl ExternalHostError {
    /// A host disabled by configuration.
    pub fn disabled(host: impl Into<String>) -> Self {
        ExternalHostError {
            kind: HostErrorKind::Disabled,
            host: host.into(),
            message: "host disabled".to_string(),
        }
    }

    /// A host that is unreachable or failing.
    pub fn unavailable(host: impl Into<String>, message: impl Into<String>) -> Self {
        ExternalHostError {
            kind: HostErrorKind::Unavailable,
            host: host.into(),
            message: message.into(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.kind == HostErrorKind::Disabled
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind == HostErrorKind::Unavailable
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self.kind {
            HostErrorKind::Disabled => {
                Diagnostic::warning(format!("host `{}` is disabled", self.host))
                    .with_suggestion("Unset `net.offline` in .freshen/config.toml to query it")
            }
            HostErrorKind::Unavailable => {
                Diagnostic::error(format!("external host `{}` failed", self.host))
                    .with_context(self.message.clone())
                    .with_suggestion("Check network access and retry later")
            }
        }
    }
}

/// Error returned by a datasource lookup.
#[derive(Debug, Error)]
pub enum DatasourceError {
    #[error(transparent)]
    ExternalHost(#[from] ExternalHostError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatasourceError {
    /// The external-host error, if this is one.
    pub fn as_external_host(&self) -> Option<&ExternalHostError> {
        match self {
            DatasourceError::ExternalHost(err) => Some(err),
            DatasourceError::Other(_) => None,
        }
    }
}
