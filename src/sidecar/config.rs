//! Service descriptor handed to the container collaborator.

use std::path::PathBuf;

/// Default compose-style project name.
pub const DEFAULT_PROJECT_NAME: &str = "pythainlp";

/// Name of the single service inside the project.
pub const SERVICE_NAME: &str = "pythainlp";

/// Pre-built image carrying PyThaiNLP and its runtime dependencies.
pub const DEFAULT_IMAGE: &str = "ghcr.io/tassa-yoniso-manasi-karoto/langkit-pythainlp:latest";

/// Working directory inside the container; the data dir is mounted here.
pub const WORKSPACE_DIR: &str = "/workspace";

/// Environment variable the service reads its corpus location from.
pub const DATA_DIR_ENV: &str = "PYTHAINLP_DATA_DIR";

/// Description of the sidecar container: one service, one mount, one port.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Project name; prefixes the container name and labels.
    pub project: String,
    /// Service name within the project.
    pub service: String,
    /// Container name.
    pub container_name: String,
    /// Image reference.
    pub image: String,
    /// Working directory inside the container.
    pub working_dir: String,
    /// Host directory bind-mounted at `working_dir`.
    pub data_dir: PathBuf,
    /// Published TCP port (same number on host and in the container).
    pub port: u16,
    /// Environment variables: (name, value).
    pub env: Vec<(String, String)>,
}

impl ServiceDescriptor {
    /// Build the descriptor for a project.
    pub fn new(
        project: impl Into<String>,
        container_name: impl Into<String>,
        image: impl Into<String>,
        data_dir: PathBuf,
        port: u16,
    ) -> Self {
        Self {
            project: project.into(),
            service: SERVICE_NAME.to_string(),
            container_name: container_name.into(),
            image: image.into(),
            working_dir: WORKSPACE_DIR.to_string(),
            data_dir,
            port,
            env: vec![(
                DATA_DIR_ENV.to_string(),
                format!("{WORKSPACE_DIR}/pythainlp-data"),
            )],
        }
    }

    /// Container name used when none is configured: `<project>-pythainlp-1`.
    pub fn default_container_name(project: &str) -> String {
        format!("{}-{}-1", project, SERVICE_NAME)
    }

    /// `host:container` bind string for the data mount.
    pub fn bind(&self) -> String {
        format!("{}:{}", self.data_dir.display(), self.working_dir)
    }

    /// Port key in Docker's `<port>/tcp` form.
    pub fn port_key(&self) -> String {
        format!("{}/tcp", self.port)
    }

    /// `NAME=value` pairs as Docker expects them.
    pub fn env_pairs(&self) -> Vec<String> {
        self.env.iter().map(|(k, v)| format!("{}={}", k, v)).collect()
    }

    /// Labels identifying the project and service.
    pub fn labels(&self) -> Vec<(String, String)> {
        vec![
            (
                "com.docker.compose.project".to_string(),
                self.project.clone(),
            ),
            (
                "com.docker.compose.service".to_string(),
                self.service.clone(),
            ),
        ]
    }

    /// Base URL of the service as seen from the host.
    pub fn service_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}
