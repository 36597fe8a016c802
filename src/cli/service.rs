//! Sidecar lifecycle commands.

use clap::Subcommand;

use crate::cli::{Cli, ctrl_c_token};

#[derive(Subcommand, Debug, Clone)]
pub enum ServiceCommand {
    /// Start the sidecar and wait until it is ready
    Init {
        /// Remove and rebuild the container first
        #[arg(long)]
        recreate: bool,

        /// With --recreate, pull the image again
        #[arg(long, requires = "recreate")]
        no_cache: bool,
    },

    /// Stop the sidecar container
    Stop,

    /// Pull the latest image
    Pull,

    /// Show service status, version and engines
    Health,
}

/// Run a lifecycle command.
pub async fn run_service_command(cli: &Cli, cmd: &ServiceCommand) -> anyhow::Result<()> {
    let manager = cli.manager().await?;

    match cmd {
        ServiceCommand::Init { recreate, no_cache } => {
            let cancel = ctrl_c_token();
            if *recreate {
                manager.init_recreate(*no_cache, &cancel).await?;
            } else {
                manager.init(&cancel).await?;
            }
            println!(
                "PyThaiNLP ready at {} (container {})",
                manager.service_url(),
                manager.container_name()
            );
        }
        ServiceCommand::Stop => {
            manager.stop().await?;
            println!("Stopped {}", manager.container_name());
        }
        ServiceCommand::Pull => {
            manager.pull_image().await?;
            println!("Image {} is up to date", manager.config().image);
        }
        ServiceCommand::Health => {
            let health = manager.client().health().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("status:  {}", health.status);
                println!("version: {}", health.version);
                for (operation, engines) in &health.engines {
                    println!("{operation}: {}", engines.join(", "));
                }
            }
        }
    }

    manager.close().await?;
    Ok(())
}
