//! Docker sidecar running the PyThaiNLP service.
//!
//! The manager never talks to Docker directly; it goes through the
//! [`ContainerRuntime`] trait. [`DockerContainer`] is the production
//! implementation built on bollard.
//!
//! ```text
//!   ensure_running()          recreate(no_cache)
//!         │                          │
//!         ▼                          ▼
//!   ┌──────────────┐          ┌──────────────┐
//!   │ Inspect      │          │ Remove       │
//!   └──────────────┘          └──────────────┘
//!    absent │ stopped               │
//!         ▼ ▼                       ▼
//!   ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//!   │ Pull Image   │────▶│ Create       │────▶│ Start        │──▶ follow logs
//!   └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! A container that exists but publishes a different port is removed and
//! created again.

pub mod config;
pub mod docker;
pub mod error;
pub mod logs;
pub mod port;
pub mod runtime;
pub mod script;

pub use config::{DEFAULT_IMAGE, DEFAULT_PROJECT_NAME, ServiceDescriptor};
pub use docker::{DockerContainer, connect_docker};
pub use error::{Result, SidecarError};
pub use logs::ContainerLogConsumer;
pub use port::allocate_port;
pub use runtime::{ContainerRuntime, ExecOutput, PullProgress};
pub use script::{PORT_PLACEHOLDER, ServerScript};
