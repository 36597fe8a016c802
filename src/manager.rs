//! Lifecycle of the PyThaiNLP sidecar.
//!
//! ```text
//!   Uninitialized ──init()──▶ Starting ──health "ready"──▶ Ready
//!                               │                           │
//!                               └──timeout / error──▶ Failed │
//!                                                            ▼
//!                                            stop() ─▶ Stopped, close() ─▶ Closed
//! ```
//!
//! `init` and `init_recreate` may be called again from any state to start
//! over. Concurrent `init` calls are not deduplicated; one initializing
//! caller is assumed.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::sidecar::script::{install_commands, launch_command};
use crate::sidecar::{
    ContainerRuntime, DockerContainer, PullProgress, ServerScript, ServiceDescriptor,
    allocate_port,
};

/// Where a manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Built, `init` not called yet.
    Uninitialized,
    /// `init` in progress.
    Starting,
    /// Service answered its health check with `ready`.
    Ready,
    /// The last `init` failed; calling it again retries.
    Failed,
    /// Container stopped via `stop()`.
    Stopped,
    /// Released via `close()`.
    Closed,
}

/// Owns the sidecar container and the client that talks to it.
pub struct Manager {
    config: ManagerConfig,
    port: u16,
    runtime: Arc<dyn ContainerRuntime>,
    client: Client,
    script: ServerScript,
    pull_progress: Option<PullProgress>,
    state: RwLock<LifecycleState>,
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("project", &self.config.project_name)
            .field("container", &self.runtime.container_name())
            .field("port", &self.port)
            .field("state", &self.state())
            .finish()
    }
}

/// Options applied before a [`Manager`] is built.
#[derive(Default)]
pub struct ManagerBuilder {
    config: ManagerConfig,
    port: Option<u16>,
    runtime: Option<Arc<dyn ContainerRuntime>>,
    script: ServerScript,
    pull_progress: Option<PullProgress>,
}

impl ManagerBuilder {
    /// Start from an existing configuration.
    pub fn from_config(config: ManagerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.config.query_timeout = timeout;
        self
    }

    /// Run an isolated instance; the container becomes `<name>-pythainlp-1`
    /// unless a container name is set explicitly.
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.config.project_name = name.into();
        self
    }

    pub fn container_name(mut self, name: impl Into<String>) -> Self {
        self.config.container_name = Some(name.into());
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.config.image = image.into();
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    pub fn startup_timeout(mut self, timeout: Duration) -> Self {
        self.config.startup_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn keep_on_close(mut self, keep: bool) -> Self {
        self.config.keep_on_close = keep;
        self
    }

    /// Progress callback for [`Manager::pull_image`]: `(current, total, status)`.
    pub fn download_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(i64, i64, &str) + Send + Sync + 'static,
    {
        self.pull_progress = Some(Arc::new(callback));
        self
    }

    /// Use this port instead of allocating one.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Use this runtime instead of connecting to Docker.
    pub fn runtime(mut self, runtime: Arc<dyn ContainerRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Install this script instead of the embedded one.
    pub fn script(mut self, script: ServerScript) -> Self {
        self.script = script;
        self
    }

    /// Allocate the port, describe the service and connect the runtime.
    pub async fn build(self) -> Result<Manager> {
        let config = self.config;

        let port = match self.port.or(config.port) {
            Some(port) => port,
            None => allocate_port().map_err(Error::PortAllocation)?,
        };

        let data_dir = config.data_dir();
        let descriptor = ServiceDescriptor::new(
            config.project_name.clone(),
            config.container_name(),
            config.image.clone(),
            data_dir.clone(),
            port,
        );

        let runtime: Arc<dyn ContainerRuntime> = match self.runtime {
            Some(runtime) => runtime,
            None => {
                tokio::fs::create_dir_all(&data_dir)
                    .await
                    .map_err(|source| Error::DataDir {
                        path: data_dir.clone(),
                        source,
                    })?;
                Arc::new(DockerContainer::connect(descriptor.clone()).await?)
            }
        };

        let client = Client::new(descriptor.service_url(), config.query_timeout)?;

        tracing::debug!(
            project = %config.project_name,
            container = %runtime.container_name(),
            port,
            "PyThaiNLP manager created"
        );

        Ok(Manager {
            config,
            port,
            runtime,
            client,
            script: self.script,
            pull_progress: self.pull_progress,
            state: RwLock::new(LifecycleState::Uninitialized),
        })
    }
}

impl Manager {
    /// Options for a new manager.
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::default()
    }

    /// Manager with the default configuration.
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    /// Ensure the container is up, then install and start the service.
    pub async fn init(&self, cancel: &CancellationToken) -> Result<()> {
        self.set_state(LifecycleState::Starting);

        let result = cancellable(cancel, async {
            self.runtime.ensure_running().await?;
            self.start_service(cancel).await
        })
        .await;

        self.finish_start(result)
    }

    /// Remove and rebuild the container (re-pulling the image with
    /// `no_cache`), then start the service.
    pub async fn init_recreate(&self, no_cache: bool, cancel: &CancellationToken) -> Result<()> {
        self.set_state(LifecycleState::Starting);

        let result = cancellable(cancel, async {
            self.runtime.recreate(no_cache).await?;
            self.start_service(cancel).await
        })
        .await;

        self.finish_start(result)
    }

    async fn start_service(&self, cancel: &CancellationToken) -> Result<()> {
        tracing::debug!("Copying service files...");
        self.install_script().await?;

        if self.is_service_running().await {
            tracing::debug!("Service is already running");
            return Ok(());
        }

        tracing::debug!("Starting Python service exec...");
        self.runtime.exec_detached(launch_command()).await?;

        tracing::debug!("Waiting for service to be ready...");
        self.wait_for_service(cancel).await
    }

    async fn install_script(&self) -> Result<()> {
        let rendered = self.script.render(self.port)?;

        for (step, cmd) in install_commands(&rendered) {
            let output = self
                .runtime
                .exec(cmd)
                .await
                .map_err(|e| Error::ScriptInjection {
                    step,
                    reason: e.to_string(),
                })?;
            if !output.success() {
                return Err(Error::ScriptInjection {
                    step,
                    reason: format!(
                        "exit code {}: {}",
                        output.exit_code.unwrap_or_default(),
                        output.stderr.trim()
                    ),
                });
            }
        }
        Ok(())
    }

    async fn is_service_running(&self) -> bool {
        match self.client.health().await {
            Ok(health) => {
                tracing::trace!(status = %health.status, "Health check response");
                health.is_ready()
            }
            Err(e) => {
                tracing::trace!("Health check error: {}", e);
                false
            }
        }
    }

    async fn wait_for_service(&self, cancel: &CancellationToken) -> Result<()> {
        let timeout = self.config.startup_timeout;
        let interval = self.config.poll_interval;
        let deadline = Instant::now() + timeout;
        let mut attempts = 0u32;

        while Instant::now() < deadline {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(interval) => {}
            }

            attempts += 1;
            tracing::trace!(attempt = attempts, "Health check attempt");

            let remaining = deadline.saturating_duration_since(Instant::now());
            let ready = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                ready = tokio::time::timeout(remaining, self.is_service_running()) => {
                    ready.unwrap_or(false)
                }
            };

            if ready {
                tracing::debug!(attempts, "Service is ready");
                return Ok(());
            }
        }

        Err(Error::ReadinessTimeout { timeout, attempts })
    }

    fn finish_start(&self, result: Result<()>) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match result {
            // stop()/close() won the race; do not resurrect the manager.
            Ok(()) if *state != LifecycleState::Starting => Err(Error::Cancelled),
            Ok(()) => {
                *state = LifecycleState::Ready;
                tracing::info!(port = self.port, "PyThaiNLP service ready");
                Ok(())
            }
            Err(e) => {
                if *state == LifecycleState::Starting {
                    *state = LifecycleState::Failed;
                }
                tracing::debug!("Service failed to start: {}", e);
                Err(e)
            }
        }
    }

    /// Pre-pull the image, reporting progress to the builder's callback.
    pub async fn pull_image(&self) -> Result<()> {
        self.runtime
            .pull_image(self.pull_progress.clone())
            .await
            .map_err(Error::from)
    }

    /// Whether the service may be called.
    pub fn is_ready(&self) -> bool {
        self.state() == LifecycleState::Ready
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, next: LifecycleState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = next;
    }

    /// Fail fast when `init` has not completed.
    pub(crate) fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::NotReady)
        }
    }

    /// Stop the container. Callers see not-ready before teardown starts.
    pub async fn stop(&self) -> Result<()> {
        self.set_state(LifecycleState::Stopped);
        self.runtime.stop().await.map_err(Error::from)
    }

    /// Release the container handle and its log consumer.
    pub async fn close(&self) -> Result<()> {
        self.set_state(LifecycleState::Closed);
        self.runtime
            .close(self.config.keep_on_close)
            .await
            .map_err(Error::from)
    }

    /// Engines the service offers, keyed by operation.
    pub async fn supported_engines(&self) -> Result<BTreeMap<String, Vec<String>>> {
        self.ensure_ready()?;
        Ok(self.client.health().await?.engines)
    }

    /// PyThaiNLP version running in the sidecar.
    pub async fn version(&self) -> Result<String> {
        self.ensure_ready()?;
        Ok(self.client.health().await?.version)
    }

    /// The transport client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Host port the service is published on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL of the service.
    pub fn service_url(&self) -> &str {
        self.client.base_url()
    }

    /// Name of the managed container.
    pub fn container_name(&self) -> &str {
        self.runtime.container_name()
    }

    /// Configuration the manager was built with.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        if self.is_ready() {
            tracing::warn!(
                "Manager for '{}' dropped without close(), container may remain running",
                self.runtime.container_name()
            );
        }
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
