//! Error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::client::ServiceError;
use crate::sidecar::SidecarError;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Environment variable {key} is not valid unicode")]
    NotUnicode { key: String },
}

/// Everything the manager, the client and the facades can fail with.
#[derive(Debug, Error)]
pub enum Error {
    // -- setup --
    #[error("Failed to allocate a local port: {0}")]
    PortAllocation(#[source] std::io::Error),

    #[error("Failed to create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    // -- container collaborator (setup and startup) --
    #[error(transparent)]
    Sidecar(#[from] SidecarError),

    // -- startup --
    #[error("Server script still contains placeholder {placeholder}; embedded asset is stale")]
    PlaceholderNotReplaced { placeholder: &'static str },

    #[error("Failed to {step}: {reason}")]
    ScriptInjection { step: &'static str, reason: String },

    // -- readiness --
    #[error("Service failed to start within {timeout:?} ({attempts} health checks)")]
    ReadinessTimeout { timeout: Duration, attempts: u32 },

    #[error("Startup cancelled")]
    Cancelled,

    #[error("Service not ready")]
    NotReady,

    // -- remote --
    #[error(transparent)]
    Service(#[from] ServiceError),

    // -- transport / parse --
    #[error("Request to {path} failed: {source}")]
    Request {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse response from {path}: {source}")]
    Decode {
        path: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {path} has neither data nor error")]
    MissingData { path: &'static str },
}

impl Error {
    /// The remote error, when the service itself rejected the request.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Error::Service(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the caller hit a manager that has not finished `init`.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Error::NotReady)
    }
}
