pub mod container;
pub mod network;
pub mod package;

pub use container::{ContainerCommands, handle_container_command};
pub use network::{NetworkCommands, handle_network_command};
pub use package::{PackageCommands, handle_package_command};
