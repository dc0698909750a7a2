use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("interface kind must be `internal` or `external`, got {0:?}")]
pub struct InvalidInterfaceKind(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid IPv4 interface address: {0:?}")]
pub struct InvalidAddress(pub String);

/// How an interface reaches the host network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    /// Virtual ethernet pair attached to a host bridge.
    Internal,
    /// Host physical device passed through to the guest.
    External,
}

impl std::fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceKind::Internal => write!(f, "internal"),
            InterfaceKind::External => write!(f, "external"),
        }
    }
}

impl FromStr for InterfaceKind {
    type Err = InvalidInterfaceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(InterfaceKind::Internal),
            "external" => Ok(InterfaceKind::External),
            other => Err(InvalidInterfaceKind(other.to_string())),
        }
    }
}

/// Static IPv4 address bound inside the guest, with an optional prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InterfaceAddress {
    pub ip: Ipv4Addr,
    pub prefix_len: Option<u8>,
}

impl InterfaceAddress {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            prefix_len: None,
        }
    }

    /// Host `.1` of the address's /24, e.g. `10.0.2.254` -> `10.0.2.1`.
    pub fn default_gateway(&self) -> Ipv4Addr {
        let [a, b, c, _] = self.ip.octets();
        Ipv4Addr::new(a, b, c, 1)
    }
}

impl From<Ipv4Addr> for InterfaceAddress {
    fn from(ip: Ipv4Addr) -> Self {
        Self::new(ip)
    }
}

impl FromStr for InterfaceAddress {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidAddress(s.to_string());
        let (ip, prefix_len) = match s.split_once('/') {
            Some((ip, prefix)) => {
                let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
                if prefix > 32 {
                    return Err(invalid());
                }
                (ip, Some(prefix))
            }
            None => (s, None),
        };
        let ip = ip.parse().map_err(|_| invalid())?;
        Ok(Self { ip, prefix_len })
    }
}

impl TryFrom<String> for InterfaceAddress {
    type Error = InvalidAddress;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<InterfaceAddress> for String {
    fn from(addr: InterfaceAddress) -> Self {
        addr.to_string()
    }
}

impl std::fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.prefix_len {
            Some(prefix) => write!(f, "{}/{}", self.ip, prefix),
            None => write!(f, "{}", self.ip),
        }
    }
}

/// A network interface attached to a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// 1-based allocation order; also the `lxc.net.<id>` index.
    pub id: u32,
    pub kind: InterfaceKind,
    pub link: String,
    pub address: InterfaceAddress,
    pub gateway: Option<Ipv4Addr>,
    /// Device name seen by the guest.
    pub name: String,
}

pub fn guest_device_name(id: u32) -> String {
    format!("eth{}", id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootfsKind {
    /// Base rootfs plus a private copy-on-write delta.
    Overlay,
    /// Plain directory.
    Dir,
}

impl RootfsKind {
    pub fn for_cloned(cloned: bool) -> Self {
        if cloned {
            RootfsKind::Overlay
        } else {
            RootfsKind::Dir
        }
    }
}

/// Distribution image used to bootstrap a container from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestTemplate {
    pub distribution: String,
    pub release: String,
    pub arch: String,
}

/// What a container's on-disk config says about it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// Value of `lxc.rootfs.path`, if present.
    pub rootfs: Option<String>,
    /// Interface stanzas ordered by id.
    pub interfaces: Vec<Interface>,
}

impl ConfigSnapshot {
    pub fn rootfs_kind(&self) -> Option<RootfsKind> {
        let rootfs = self.rootfs.as_deref()?;
        if rootfs.starts_with("overlay:") || rootfs.starts_with("overlayfs:") {
            Some(RootfsKind::Overlay)
        } else {
            Some(RootfsKind::Dir)
        }
    }
}
