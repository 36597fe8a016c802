//! Failures of the container collaborator.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SidecarError>;

/// What went wrong while driving the sidecar container through Docker.
#[derive(Debug, Error)]
pub enum SidecarError {
    /// No daemon could be reached, or it rejected an inspect call.
    #[error("Docker not available: {reason}")]
    DockerNotAvailable { reason: String },

    #[error("Failed to pull image '{image}': {reason}")]
    ImagePullFailed { image: String, reason: String },

    #[error("Failed to create container '{name}': {reason}")]
    ContainerCreationFailed { name: String, reason: String },

    #[error("Failed to start container '{name}': {reason}")]
    ContainerStartFailed { name: String, reason: String },

    /// Covers both stop and forced removal.
    #[error("Failed to stop container '{name}': {reason}")]
    ContainerStopFailed { name: String, reason: String },

    /// Creating, starting or inspecting an exec failed. A command that runs
    /// and exits non-zero is not an error at this level.
    #[error("Exec in container '{name}' failed: {reason}")]
    ExecFailed { name: String, reason: String },

    /// The runtime was used after `close()`.
    #[error("Container handle for '{name}' has been closed")]
    Closed { name: String },
}
