use crate::error::ContainerError;
use farm_runtime::{InterfaceAddress, InterfaceKind};
use std::net::Ipv4Addr;

/// Interface to attach to a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRequest {
    pub kind: InterfaceKind,
    pub address: InterfaceAddress,
    /// Host bridge (internal) or physical device (external).
    pub link: Option<String>,
    /// Only used for external interfaces.
    pub gateway: Option<Ipv4Addr>,
}

impl InterfaceRequest {
    pub fn new(kind: InterfaceKind, address: InterfaceAddress) -> Self {
        Self {
            kind,
            address,
            link: None,
            gateway: None,
        }
    }

    pub fn internal(address: InterfaceAddress) -> Self {
        Self::new(InterfaceKind::Internal, address)
    }

    pub fn external(address: InterfaceAddress, link: impl Into<String>) -> Self {
        Self::new(InterfaceKind::External, address).with_link(link)
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_gateway(mut self, gateway: Ipv4Addr) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Host-side link this interface attaches to.
    pub(crate) fn resolve_link(&self, bridge: &str) -> Result<String, ContainerError> {
        let link = self.link.as_deref().filter(|l| !l.is_empty());
        match (self.kind, link) {
            (_, Some(link)) => Ok(link.to_string()),
            (InterfaceKind::Internal, None) => Ok(bridge.to_string()),
            (InterfaceKind::External, None) => Err(ContainerError::MissingLink),
        }
    }
}
