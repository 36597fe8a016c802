//! Manager configuration.
//!
//! Defaults are chosen for a single local sidecar; every field can be
//! overridden through `PYTHAINLP_*` environment variables or the
//! [`ManagerBuilder`](crate::ManagerBuilder) options.

pub(crate) mod helpers;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::sidecar::config::{DEFAULT_IMAGE, DEFAULT_PROJECT_NAME, ServiceDescriptor};
use helpers::{optional_env, parse_bool_env, parse_optional_env};

/// Per-request timeout for service calls.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// How long `init` waits for the service to report ready. A first run may
/// have to pull a multi-gigabyte image and warm the models.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(480);

/// Interval between health checks while starting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration for a [`Manager`](crate::Manager).
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Project name; namespaces the container and the data dir.
    pub project_name: String,
    /// Container name. `None` derives `<project>-pythainlp-1`.
    pub container_name: Option<String>,
    /// Image reference.
    pub image: String,
    /// Host directory mounted into the container. `None` uses
    /// `<config dir>/<project>`.
    pub data_dir: Option<PathBuf>,
    /// Per-request timeout for service calls.
    pub query_timeout: Duration,
    /// Maximum wait for readiness during `init`.
    pub startup_timeout: Duration,
    /// Interval between readiness polls.
    pub poll_interval: Duration,
    /// Leave the container running on `close()`.
    pub keep_on_close: bool,
    /// Fixed host port. `None` allocates a free one per manager.
    pub port: Option<u16>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            container_name: None,
            image: DEFAULT_IMAGE.to_string(),
            data_dir: None,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            keep_on_close: false,
            port: None,
        }
    }
}

impl ManagerConfig {
    /// Read overrides from the environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            project_name: optional_env("PYTHAINLP_PROJECT_NAME")?
                .unwrap_or(defaults.project_name),
            container_name: optional_env("PYTHAINLP_CONTAINER_NAME")?,
            image: optional_env("PYTHAINLP_IMAGE")?.unwrap_or(defaults.image),
            data_dir: optional_env("PYTHAINLP_HOST_DATA_DIR")?.map(PathBuf::from),
            query_timeout: Duration::from_secs(parse_optional_env(
                "PYTHAINLP_QUERY_TIMEOUT_SECS",
                defaults.query_timeout.as_secs(),
            )?),
            startup_timeout: Duration::from_secs(parse_optional_env(
                "PYTHAINLP_STARTUP_TIMEOUT_SECS",
                defaults.startup_timeout.as_secs(),
            )?),
            poll_interval: Duration::from_millis(parse_optional_env(
                "PYTHAINLP_POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )?),
            keep_on_close: parse_bool_env("PYTHAINLP_KEEP_ON_CLOSE", defaults.keep_on_close)?,
            port: optional_env("PYTHAINLP_PORT")?
                .map(|v| {
                    v.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                        key: "PYTHAINLP_PORT".to_string(),
                        message: e.to_string(),
                    })
                })
                .transpose()?,
        })
    }

    /// Container name, derived from the project when not set.
    pub fn container_name(&self) -> String {
        self.container_name
            .clone()
            .unwrap_or_else(|| ServiceDescriptor::default_container_name(&self.project_name))
    }

    /// Host data directory, derived from the project when not set.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(&self.project_name)
        })
    }
}
