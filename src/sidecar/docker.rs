//! Docker-backed [`ContainerRuntime`].

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, LogOutput, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, PortBinding};
use futures::StreamExt;
use tokio::sync::{Mutex, RwLock};

use crate::sidecar::config::ServiceDescriptor;
use crate::sidecar::error::{Result, SidecarError};
use crate::sidecar::logs::ContainerLogConsumer;
use crate::sidecar::runtime::{ContainerRuntime, ExecOutput, PullProgress};

const STOP_TIMEOUT_SECS: i64 = 10;

/// What `inspect` found under the container name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerStatus {
    Missing,
    /// Exists but does not publish the descriptor's port.
    Stale,
    Stopped,
    Running,
}

/// Connect to the local Docker daemon.
///
/// Tries bollard's defaults (`DOCKER_HOST` or the platform socket) first, then
/// the Docker Desktop socket under the home directory and the rootless socket
/// under `XDG_RUNTIME_DIR`.
pub async fn connect_docker() -> Result<Docker> {
    let mut reason = match Docker::connect_with_local_defaults() {
        Ok(docker) => match docker.ping().await {
            Ok(_) => return Ok(docker),
            Err(e) => e.to_string(),
        },
        Err(e) => e.to_string(),
    };

    #[cfg(unix)]
    for socket in fallback_sockets() {
        if !socket.exists() {
            continue;
        }
        let path = socket.to_string_lossy();
        match Docker::connect_with_socket(&path, 120, bollard::API_DEFAULT_VERSION) {
            Ok(docker) => match docker.ping().await {
                Ok(_) => {
                    tracing::debug!("Connected to Docker via {}", path);
                    return Ok(docker);
                }
                Err(e) => reason = format!("{path}: {e}"),
            },
            Err(e) => reason = format!("{path}: {e}"),
        }
    }

    Err(SidecarError::DockerNotAvailable { reason })
}

#[cfg(unix)]
fn fallback_sockets() -> Vec<PathBuf> {
    let mut sockets = Vec::new();
    if let Some(home) = dirs::home_dir() {
        sockets.push(home.join(".docker/run/docker.sock"));
    }
    if let Some(runtime_dir) = std::env::var_os("XDG_RUNTIME_DIR") {
        sockets.push(PathBuf::from(runtime_dir).join("docker.sock"));
    }
    sockets
}

fn is_not_found(e: &BollardError) -> bool {
    matches!(
        e,
        BollardError::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

fn is_not_modified(e: &BollardError) -> bool {
    matches!(
        e,
        BollardError::DockerResponseServerError {
            status_code: 304,
            ..
        }
    )
}

/// One sidecar container driven through the Docker API.
pub struct DockerContainer {
    descriptor: ServiceDescriptor,
    docker: RwLock<Option<Docker>>,
    logs: Mutex<Option<ContainerLogConsumer>>,
}

impl DockerContainer {
    /// Connect to Docker for the given descriptor. Nothing is created yet.
    pub async fn connect(descriptor: ServiceDescriptor) -> Result<Self> {
        let docker = connect_docker().await?;
        Ok(Self::with_client(descriptor, docker))
    }

    /// Use an existing Docker client.
    pub fn with_client(descriptor: ServiceDescriptor, docker: Docker) -> Self {
        Self {
            descriptor,
            docker: RwLock::new(Some(docker)),
            logs: Mutex::new(None),
        }
    }

    /// The descriptor this container is built from.
    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    async fn client(&self) -> Result<Docker> {
        self.docker
            .read()
            .await
            .clone()
            .ok_or_else(|| SidecarError::Closed {
                name: self.descriptor.container_name.clone(),
            })
    }

    async fn inspect(&self, docker: &Docker) -> Result<ContainerStatus> {
        let name = &self.descriptor.container_name;
        let info = match docker
            .inspect_container(name, None::<InspectContainerOptions>)
            .await
        {
            Ok(info) => info,
            Err(e) if is_not_found(&e) => return Ok(ContainerStatus::Missing),
            Err(e) => {
                return Err(SidecarError::DockerNotAvailable {
                    reason: e.to_string(),
                });
            }
        };

        let host_port = self.descriptor.port.to_string();
        let publishes_port = info
            .host_config
            .and_then(|hc| hc.port_bindings)
            .is_some_and(|bindings| {
                bindings
                    .get(&self.descriptor.port_key())
                    .and_then(|b| b.as_ref())
                    .is_some_and(|b| {
                        b.iter()
                            .any(|pb| pb.host_port.as_deref() == Some(host_port.as_str()))
                    })
            });
        if !publishes_port {
            return Ok(ContainerStatus::Stale);
        }

        if info.state.and_then(|s| s.running).unwrap_or(false) {
            Ok(ContainerStatus::Running)
        } else {
            Ok(ContainerStatus::Stopped)
        }
    }

    async fn pull(&self, docker: &Docker, force: bool, progress: Option<PullProgress>) -> Result<()> {
        let image = &self.descriptor.image;
        if !force && docker.inspect_image(image).await.is_ok() {
            tracing::debug!("Image '{}' exists locally", image);
            return Ok(());
        }

        tracing::info!("Pulling image: {}", image);

        let options = CreateImageOptions {
            from_image: image.clone(),
            ..Default::default()
        };
        let mut stream = docker.create_image(Some(options), None, None);

        while let Some(result) = stream.next().await {
            let info = result.map_err(|e| SidecarError::ImagePullFailed {
                image: image.clone(),
                reason: e.to_string(),
            })?;
            let status = info.status.unwrap_or_default();
            tracing::trace!("Pull status: {}", status);
            if let Some(cb) = progress.as_ref() {
                let (current, total) = info
                    .progress_detail
                    .map(|d| (d.current.unwrap_or(0), d.total.unwrap_or(0)))
                    .unwrap_or((0, 0));
                cb(current, total, &status);
            }
        }

        tracing::info!("Pulled image: {}", image);
        Ok(())
    }

    async fn create(&self, docker: &Docker) -> Result<String> {
        let desc = &self.descriptor;

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            desc.port_key(),
            Some(vec![PortBinding {
                host_ip: Some("127.0.0.1".to_string()),
                host_port: Some(desc.port.to_string()),
            }]),
        );

        let exposed_ports: HashMap<String, HashMap<(), ()>> =
            HashMap::from([(desc.port_key(), HashMap::new())]);

        let host_config = HostConfig {
            port_bindings: Some(port_bindings),
            binds: Some(vec![desc.bind()]),
            auto_remove: Some(false),
            ..Default::default()
        };

        let config = Config {
            image: Some(desc.image.clone()),
            env: Some(desc.env_pairs()),
            working_dir: Some(desc.working_dir.clone()),
            labels: Some(desc.labels().into_iter().collect()),
            exposed_ports: Some(exposed_ports),
            host_config: Some(host_config),
            // The image's main process is interactive; keep it attached.
            tty: Some(true),
            open_stdin: Some(true),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: desc.container_name.clone(),
            ..Default::default()
        };

        let response = docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| SidecarError::ContainerCreationFailed {
                name: desc.container_name.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(id = %response.id, "Created container {}", desc.container_name);
        Ok(response.id)
    }

    async fn start(&self, docker: &Docker) -> Result<()> {
        let name = &self.descriptor.container_name;
        docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await
            .or_else(|e| if is_not_modified(&e) { Ok(()) } else { Err(e) })
            .map_err(|e| SidecarError::ContainerStartFailed {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        tracing::info!("Started sidecar container: {}", name);
        Ok(())
    }

    async fn remove(&self, docker: &Docker) -> Result<()> {
        let name = &self.descriptor.container_name;
        match docker
            .remove_container(
                name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(SidecarError::ContainerStopFailed {
                name: name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    async fn attach_logs(&self, docker: &Docker) {
        let mut logs = self.logs.lock().await;
        if logs.as_ref().is_some_and(|l| l.is_active()) {
            return;
        }
        *logs = Some(ContainerLogConsumer::follow(
            docker.clone(),
            &self.descriptor.container_name,
            self.descriptor.project.clone(),
        ));
    }

    async fn detach_logs(&self) {
        if let Some(mut consumer) = self.logs.lock().await.take() {
            consumer.close();
        }
    }

    fn exec_failed(&self, e: impl std::fmt::Display) -> SidecarError {
        SidecarError::ExecFailed {
            name: self.descriptor.container_name.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerContainer {
    fn container_name(&self) -> &str {
        &self.descriptor.container_name
    }

    async fn ensure_running(&self) -> Result<()> {
        let docker = self.client().await?;

        match self.inspect(&docker).await? {
            ContainerStatus::Running => {
                tracing::debug!("Container {} already running", self.descriptor.container_name)
            }
            ContainerStatus::Stopped => self.start(&docker).await?,
            ContainerStatus::Stale => {
                tracing::debug!(
                    "Container {} publishes another port, recreating",
                    self.descriptor.container_name
                );
                self.remove(&docker).await?;
                self.pull(&docker, false, None).await?;
                self.create(&docker).await?;
                self.start(&docker).await?;
            }
            ContainerStatus::Missing => {
                self.pull(&docker, false, None).await?;
                self.create(&docker).await?;
                self.start(&docker).await?;
            }
        }

        self.attach_logs(&docker).await;
        Ok(())
    }

    async fn recreate(&self, no_cache: bool) -> Result<()> {
        let docker = self.client().await?;

        self.detach_logs().await;
        self.remove(&docker).await?;
        self.pull(&docker, no_cache, None).await?;
        self.create(&docker).await?;
        self.start(&docker).await?;
        self.attach_logs(&docker).await;
        Ok(())
    }

    async fn pull_image(&self, progress: Option<PullProgress>) -> Result<()> {
        let docker = self.client().await?;
        self.pull(&docker, true, progress).await
    }

    async fn exec(&self, cmd: Vec<String>) -> Result<ExecOutput> {
        let docker = self.client().await?;
        tracing::trace!(command = ?cmd, "Executing command");

        let exec = docker
            .create_exec(
                &self.descriptor.container_name,
                CreateExecOptions {
                    cmd: Some(cmd),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    tty: Some(false),
                    working_dir: Some(self.descriptor.working_dir.clone()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| self.exec_failed(e))?;

        let mut out = ExecOutput::default();
        if let StartExecResults::Attached { mut output, .. } = docker
            .start_exec(&exec.id, None)
            .await
            .map_err(|e| self.exec_failed(e))?
        {
            while let Some(chunk) = output.next().await {
                match chunk.map_err(|e| self.exec_failed(e))? {
                    LogOutput::StdOut { message } | LogOutput::Console { message } => {
                        out.stdout.push_str(&String::from_utf8_lossy(&message))
                    }
                    LogOutput::StdErr { message } => {
                        out.stderr.push_str(&String::from_utf8_lossy(&message))
                    }
                    LogOutput::StdIn { .. } => {}
                }
            }
        }

        let inspect = docker
            .inspect_exec(&exec.id)
            .await
            .map_err(|e| self.exec_failed(e))?;
        out.exit_code = inspect.exit_code;

        tracing::trace!(exit_code = ?out.exit_code, stdout = %out.stdout, "Command output");
        Ok(out)
    }

    async fn exec_detached(&self, cmd: Vec<String>) -> Result<()> {
        let docker = self.client().await?;

        let exec = docker
            .create_exec(
                &self.descriptor.container_name,
                CreateExecOptions {
                    cmd: Some(cmd),
                    attach_stdout: Some(false),
                    attach_stderr: Some(false),
                    tty: Some(false),
                    working_dir: Some(self.descriptor.working_dir.clone()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| self.exec_failed(e))?;

        docker
            .start_exec(
                &exec.id,
                Some(StartExecOptions {
                    detach: true,
                    ..Default::default()
                }),
            )
            .await
            .map_err(|e| self.exec_failed(e))?;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let docker = self.client().await?;
        let name = &self.descriptor.container_name;

        match docker
            .stop_container(name, Some(StopContainerOptions { t: STOP_TIMEOUT_SECS }))
            .await
        {
            Ok(()) => {
                tracing::info!("Stopped sidecar container: {}", name);
                Ok(())
            }
            Err(e) if is_not_found(&e) || is_not_modified(&e) => Ok(()),
            Err(e) => Err(SidecarError::ContainerStopFailed {
                name: name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    async fn close(&self, keep_running: bool) -> Result<()> {
        self.detach_logs().await;
        let result = if keep_running {
            tracing::info!(
                "Keeping sidecar container running: {}",
                self.descriptor.container_name
            );
            Ok(())
        } else {
            self.stop().await
        };
        self.docker.write().await.take();
        match result {
            Err(SidecarError::Closed { .. }) => Ok(()),
            other => other,
        }
    }
}
