//! The seam between the lifecycle manager and whatever runs the container.

use async_trait::async_trait;

use crate::sidecar::error::Result;

/// Progress callback for image pulls: `(current, total, status)`.
pub type PullProgress = std::sync::Arc<dyn Fn(i64, i64, &str) + Send + Sync>;

/// Output of an attached exec.
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    /// Exit code, when the runtime reports one.
    pub exit_code: Option<i64>,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl ExecOutput {
    /// A missing exit code counts as success.
    pub fn success(&self) -> bool {
        self.exit_code.unwrap_or(0) == 0
    }
}

/// Container lifecycle primitives the manager delegates to.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Name of the managed container.
    fn container_name(&self) -> &str;

    /// Create and start the container if needed. Idempotent.
    async fn ensure_running(&self) -> Result<()>;

    /// Remove the container and bring up a fresh one. With `no_cache` the
    /// image is fetched again even when present locally.
    async fn recreate(&self, no_cache: bool) -> Result<()>;

    /// Fetch the image ahead of `ensure_running`.
    async fn pull_image(&self, progress: Option<PullProgress>) -> Result<()>;

    /// Run a command and wait for it, collecting its output.
    async fn exec(&self, cmd: Vec<String>) -> Result<ExecOutput>;

    /// Start a command and return without waiting for it.
    async fn exec_detached(&self, cmd: Vec<String>) -> Result<()>;

    /// Stop the container.
    async fn stop(&self) -> Result<()>;

    /// Release the handle and anything attached to it (log consumer). The
    /// container is stopped first unless `keep_running` is set.
    async fn close(&self, keep_running: bool) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_output_success() {
        assert!(ExecOutput::default().success());
        assert!(
            !ExecOutput {
                exit_code: Some(2),
                ..Default::default()
            }
            .success()
        );
    }
}
