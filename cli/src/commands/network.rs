use clap::Subcommand;
use farm_container::{ContainerError, InterfaceRequest, Provisioner};
use farm_runtime::{InterfaceAddress, InterfaceKind};
use std::net::Ipv4Addr;

#[derive(Subcommand)]
pub enum NetworkCommands {
    /// Attach a network interface to a container
    AddInterface {
        /// Container name
        name: String,

        /// Interface kind: internal (bridged veth) or external (host NIC)
        #[arg(long)]
        kind: InterfaceKind,

        /// Static IPv4 address, optionally with a prefix length (e.g. 10.0.2.5/24)
        #[arg(long)]
        address: InterfaceAddress,

        /// Host bridge or NIC; internal interfaces default to the configured bridge
        #[arg(long)]
        link: Option<String>,

        /// Gateway for external interfaces; defaults to a.b.c.1 of the address
        #[arg(long)]
        gateway: Option<Ipv4Addr>,
    },
}

pub async fn handle_network_command(
    provisioner: &Provisioner,
    cmd: NetworkCommands,
) -> Result<(), ContainerError> {
    match cmd {
        NetworkCommands::AddInterface {
            name,
            kind,
            address,
            link,
            gateway,
        } => {
            let mut request = InterfaceRequest::new(kind, address);
            if let Some(link) = link {
                request = request.with_link(link);
            }
            if let Some(gateway) = gateway {
                request = request.with_gateway(gateway);
            }

            let mut container = provisioner.container(&name).await?;
            let iface = container.add_interface(request).await?;
            println!("{} {} via {}", iface.name, iface.address, iface.link);
        }
    }

    Ok(())
}
