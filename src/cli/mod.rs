//! CLI command handling.
//!
//! Provides subcommands for:
//! - Managing the sidecar (`init`, `stop`, `pull`, `health`)
//! - Querying it (`tokenize`, `romanize`, `transliterate`, `syllables`, `analyze`)
//! - Shell completions (`completion`)

mod completion;
mod query;
mod service;

pub use completion::Completion;
pub use query::{QueryCommand, run_query_command};
pub use service::{ServiceCommand, run_service_command};

use clap::{ColorChoice, Parser, Subcommand};

use pythainlp_sidecar::{CancellationToken, Manager, ManagerBuilder, ManagerConfig};

/// Port used by the CLI when neither `--port` nor `PYTHAINLP_PORT` is set.
/// Fixed so that separate invocations reach the same container.
pub const DEFAULT_CLI_PORT: u16 = 45873;

#[derive(Parser, Debug)]
#[command(name = "pythainlp")]
#[command(about = "Run PyThaiNLP in a Docker sidecar and query it")]
#[command(
    long_about = "Manages a PyThaiNLP container and sends it Thai text.\nExamples:\n  pythainlp init  # Start the sidecar\n  pythainlp tokenize 'สวัสดีครับ'  # Word tokenization"
)]
#[command(version)]
#[command(color = ColorChoice::Auto)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print the result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Project name; namespaces the container and its data dir
    #[arg(long, global = true, env = "PYTHAINLP_PROJECT_NAME")]
    pub project: Option<String>,

    /// Host port the service is published on
    #[arg(long, global = true, env = "PYTHAINLP_PORT")]
    pub port: Option<u16>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(flatten)]
    Service(ServiceCommand),

    #[command(flatten)]
    Query(QueryCommand),

    /// Generate shell completion scripts
    Completion(Completion),
}

impl Cli {
    /// Manager configuration: environment first, then command-line overrides.
    pub fn manager_config(&self) -> anyhow::Result<ManagerConfig> {
        let mut config = ManagerConfig::from_env()?;
        if let Some(project) = &self.project {
            config.project_name = project.clone();
        }
        config.port = Some(self.port.or(config.port).unwrap_or(DEFAULT_CLI_PORT));
        // The CLI exits after every command; the container outlives it.
        config.keep_on_close = true;
        Ok(config)
    }

    pub async fn manager(&self) -> anyhow::Result<Manager> {
        Ok(ManagerBuilder::from_config(self.manager_config()?)
            .download_progress(|current, total, status| {
                if total > 0 {
                    eprintln!("{status}: {current}/{total}");
                } else {
                    eprintln!("{status}");
                }
            })
            .build()
            .await?)
    }
}

/// Token cancelled on Ctrl-C.
pub fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, cancelling...");
            child.cancel();
        }
    });
    token
}
