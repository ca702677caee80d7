use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::circus::target::Target;

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("target {0:?} must be 'host', 'user@host', '*@host', 'user@*' or '*'")]
    Invalid(String),
}

/// Failure to turn a target into a control endpoint.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("{target}: circus config {} does not exist", path.display())]
    NotFound { target: Target, path: PathBuf },

    #[error("{target}: circus config {} is malformed: {reason}", path.display())]
    Malformed {
        target: Target,
        path: PathBuf,
        reason: String,
    },

    #[error("{target}: failed to read circus config {}", path.display())]
    Unreadable {
        target: Target,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolutionError {
    pub fn target(&self) -> &Target {
        match self {
            ResolutionError::NotFound { target, .. }
            | ResolutionError::Malformed { target, .. }
            | ResolutionError::Unreadable { target, .. } => target,
        }
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("{host}: unit listing failed: {reason}")]
    RemoteFailure { host: String, reason: String },

    #[error("no circus instances found for {scope}")]
    EmptyResult { scope: String },

    #[error("{target}: no systemd unit {unit} on {}", target.host)]
    MissingUnit { target: Target, unit: String },
}

/// Per-target dispatch failure. Captured in the result, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("exited with status {}", code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    NonZeroExit { code: Option<i32> },

    #[error("transport failure: {reason}")]
    TransportFailure { reason: String },
}
