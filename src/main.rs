//! pythainlp - command-line front end for the PyThaiNLP sidecar.

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, run_query_command, run_service_command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match &cli.command {
        Command::Service(cmd) => run_service_command(&cli, cmd).await,
        Command::Query(cmd) => run_query_command(&cli, cmd).await,
        Command::Completion(completion) => completion.run(),
    }
}
