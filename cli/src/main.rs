mod commands;
mod settings;
mod utils;

use clap::{Parser, Subcommand};
use commands::{
    ContainerCommands, NetworkCommands, PackageCommands, handle_container_command,
    handle_network_command, handle_package_command,
};
use farm_container::Provisioner;
use farm_exec::ProcessRunner;
use farm_guest::AlpinePersona;
use farm_runtime::LxcBackend;
use settings::HostArgs;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "farm")]
#[command(about = "Provision LXC containers cloned from a single Alpine base")]
struct Cli {
    #[command(flatten)]
    host: HostArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Container(ContainerCommands),
    #[command(flatten)]
    Network(NetworkCommands),
    #[command(flatten)]
    Package(PackageCommands),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let lxc_config = cli.host.lxc_config();
    tracing::debug!(?lxc_config, "Using LXC settings");

    let runner = Arc::new(ProcessRunner::new(lxc_config.command_timeout()));
    let backend = Arc::new(LxcBackend::new(runner, lxc_config.clone()));
    let persona = Arc::new(AlpinePersona::new(cli.host.alpine_config()));
    let provisioner = Provisioner::new(backend, persona, &lxc_config);

    match cli.command {
        Commands::Container(cmd) => handle_container_command(&provisioner, cmd).await?,
        Commands::Network(cmd) => handle_network_command(&provisioner, cmd).await?,
        Commands::Package(cmd) => handle_package_command(&provisioner, cmd).await?,
    }

    Ok(())
}
