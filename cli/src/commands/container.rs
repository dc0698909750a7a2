use crate::utils::print_json;
use clap::Subcommand;
use farm_container::{ContainerError, Provisioner};

#[derive(Subcommand)]
pub enum ContainerCommands {
    /// Bootstrap the base container if it does not exist yet
    Base,
    /// Get or clone a container from the base
    Create {
        /// Container name
        name: String,
    },
    /// Print the runtime state of a container
    State {
        /// Container name
        name: String,
    },
    /// Start a container
    Start {
        /// Container name
        name: String,
    },
    /// Stop a container
    Stop {
        /// Container name
        name: String,
    },
    /// Print a JSON summary of a container
    Inspect {
        /// Container name
        name: String,
    },
    /// Print the address of the container's internal interface
    Ip {
        /// Container name
        name: String,
    },
}

pub async fn handle_container_command(
    provisioner: &Provisioner,
    cmd: ContainerCommands,
) -> Result<(), ContainerError> {
    match cmd {
        ContainerCommands::Base => {
            let base = provisioner.base().await?;
            println!("{}", base.name());
        }
        ContainerCommands::Create { name } => {
            let container = provisioner.container(&name).await?;
            println!("{}", container.name());
        }
        ContainerCommands::State { name } => {
            let container = provisioner.container(&name).await?;
            println!("{}", container.state().await?);
        }
        ContainerCommands::Start { name } => {
            provisioner.container(&name).await?.start().await?;
            println!("Container {} started", name);
        }
        ContainerCommands::Stop { name } => {
            provisioner.container(&name).await?.stop().await?;
            println!("Container {} stopped", name);
        }
        ContainerCommands::Inspect { name } => {
            let container = provisioner.container(&name).await?;
            print_json(&container.summary().await?);
        }
        ContainerCommands::Ip { name } => {
            let container = provisioner.container(&name).await?;
            println!("{}", container.ip()?);
        }
    }

    Ok(())
}
