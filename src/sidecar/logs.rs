//! Forwards container output into `tracing`.

use bollard::Docker;
use bollard::container::{LogOutput, LogsOptions};
use futures::StreamExt;
use tokio::task::JoinHandle;

/// Follows a container's stdout/stderr until closed.
pub struct ContainerLogConsumer {
    prefix: String,
    task: Option<JoinHandle<()>>,
}

impl ContainerLogConsumer {
    /// Start following `container`. Lines are emitted at trace level under
    /// `prefix`.
    pub fn follow(docker: Docker, container: &str, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let container = container.to_string();
        let task_prefix = prefix.clone();

        let task = tokio::spawn(async move {
            let options = LogsOptions::<String> {
                follow: true,
                stdout: true,
                stderr: true,
                tail: "0".to_string(),
                ..Default::default()
            };
            let mut stream = docker.logs(&container, Some(options));

            while let Some(item) = stream.next().await {
                match item {
                    Ok(output) => emit(&task_prefix, output),
                    Err(e) => {
                        tracing::debug!("[{}] log stream ended: {}", task_prefix, e);
                        break;
                    }
                }
            }
        });

        Self {
            prefix,
            task: Some(task),
        }
    }

    /// Stop following. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("[{}] log consumer closed", self.prefix);
        }
    }

    /// Whether the consumer is still attached.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for ContainerLogConsumer {
    fn drop(&mut self) {
        self.close();
    }
}

fn emit(prefix: &str, output: LogOutput) {
    let (stream, message) = match output {
        LogOutput::StdErr { message } => ("stderr", message),
        LogOutput::StdOut { message } => ("stdout", message),
        LogOutput::Console { message } => ("console", message),
        LogOutput::StdIn { message } => ("stdin", message),
    };
    let text = String::from_utf8_lossy(&message);
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        tracing::trace!(target: "pythainlp::container", "[{}] {}: {}", prefix, stream, line);
    }
}
