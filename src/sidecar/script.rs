//! The embedded server script and how it is installed into the container.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Literal token in the script that is replaced by the allocated port.
pub const PORT_PLACEHOLDER: &str = "__PYTHAINLP_SERVICE_PORT__";

/// Directory inside the container holding the server script.
pub const SERVICE_DIR: &str = "/workspace/service";

/// Path of the server script inside the container.
pub const SCRIPT_PATH: &str = "/workspace/service/server.py";

const EMBEDDED_SERVER: &str = include_str!("../../assets/server.py");

/// A server script template carrying the port placeholder.
#[derive(Debug, Clone, Copy)]
pub struct ServerScript {
    template: &'static str,
}

impl Default for ServerScript {
    fn default() -> Self {
        Self::embedded()
    }
}

impl ServerScript {
    /// The script shipped with this crate.
    pub fn embedded() -> Self {
        Self {
            template: EMBEDDED_SERVER,
        }
    }

    /// Wrap another template (tests, custom builds).
    pub fn from_template(template: &'static str) -> Self {
        Self { template }
    }

    /// Substitute the port. A template without the placeholder is a stale
    /// asset and is rejected rather than left to listen on the wrong port.
    pub fn render(&self, port: u16) -> Result<String> {
        if !self.template.contains(PORT_PLACEHOLDER) {
            return Err(Error::PlaceholderNotReplaced {
                placeholder: PORT_PLACEHOLDER,
            });
        }

        let rendered = self.template.replace(PORT_PLACEHOLDER, &port.to_string());
        if rendered.contains(PORT_PLACEHOLDER) {
            return Err(Error::PlaceholderNotReplaced {
                placeholder: PORT_PLACEHOLDER,
            });
        }

        Ok(rendered)
    }
}

/// Commands that create the service dir, write `content` to the script path
/// and mark it executable. Content travels base64-encoded so no shell quoting
/// of the script body is needed.
pub fn install_commands(content: &str) -> Vec<(&'static str, Vec<String>)> {
    let encoded = STANDARD.encode(content.as_bytes());
    vec![
        ("create service directory", shell(format!("mkdir -p {SERVICE_DIR}"))),
        (
            "write server script",
            shell(format!("echo '{encoded}' | base64 -d > {SCRIPT_PATH}")),
        ),
        ("chmod server script", shell(format!("chmod +x {SCRIPT_PATH}"))),
    ]
}

/// Command that runs the server in the foreground of a detached exec.
pub fn launch_command() -> Vec<String> {
    shell(format!("exec python -u {SCRIPT_PATH}"))
}

fn shell(script: String) -> Vec<String> {
    vec!["/bin/bash".to_string(), "-c".to_string(), script]
}
