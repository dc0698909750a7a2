mod base;
mod container;
mod error;
mod interface;
mod provisioner;

pub use base::BaseImageManager;
pub use container::{Container, ContainerSummary};
pub use error::ContainerError;
pub use interface::InterfaceRequest;
pub use provisioner::Provisioner;
