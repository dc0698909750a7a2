//! Rendering and parsing of the LXC container `config` file.
//!
//! The file is built append-only, in three kinds of sections: the general
//! boilerplate, the container-specific rootfs/hostname directives, and one
//! numbered stanza per network interface.

use crate::types::{ConfigSnapshot, Interface, InterfaceKind};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

const NESTING_INCLUDE: &str = "/usr/share/lxc/config/nesting.conf";
const ARCH: &str = "linux64";

/// Host-side veth peer name: `v` plus the upper-cased container name cut to 10 chars.
pub fn veth_pair_name(container: &str) -> String {
    let upper: String = container.to_uppercase().chars().take(10).collect();
    format!("v{}", upper)
}

pub(crate) fn general_section() -> Vec<String> {
    vec![
        "# general".to_string(),
        format!("lxc.include = {}", NESTING_INCLUDE),
        format!("lxc.arch = {}", ARCH),
    ]
}

pub(crate) fn specific_section(name: &str, rootfs_directive: &str) -> Vec<String> {
    vec![
        String::new(),
        "# container-specific".to_string(),
        format!("lxc.rootfs.path = {}", rootfs_directive),
        format!("lxc.uts.name = {}", name),
    ]
}

pub(crate) fn interface_section(container: &str, iface: &Interface) -> Vec<String> {
    let id = iface.id;
    let device_type = match iface.kind {
        InterfaceKind::External => "phys",
        InterfaceKind::Internal => "veth",
    };

    let mut lines = vec![
        String::new(),
        format!("# {} interface", iface.kind),
        format!("lxc.net.{}.type = {}", id, device_type),
        format!("lxc.net.{}.link = {}", id, iface.link),
        format!("lxc.net.{}.flags = up", id),
        format!("lxc.net.{}.name = {}", id, iface.name),
        format!("lxc.net.{}.veth.pair = {}", id, veth_pair_name(container)),
        format!("lxc.net.{}.ipv4.address = {}", id, iface.address),
    ];
    if let Some(gateway) = iface.gateway {
        lines.push(format!("lxc.net.{}.ipv4.gateway = {}", id, gateway));
    }
    lines
}

#[derive(Default)]
struct PartialInterface {
    device_type: Option<String>,
    link: Option<String>,
    name: Option<String>,
    address: Option<String>,
    gateway: Option<String>,
}

/// Parses a container config back into the parts this crate writes.
///
/// Interface stanzas that are missing their type or address, or whose
/// values do not parse, are skipped.
pub fn parse_config(content: &str) -> ConfigSnapshot {
    let mut snapshot = ConfigSnapshot::default();
    let mut partials: BTreeMap<u32, PartialInterface> = BTreeMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim().to_string());

        if key == "lxc.rootfs.path" {
            snapshot.rootfs = Some(value);
            continue;
        }

        let Some(rest) = key.strip_prefix("lxc.net.") else {
            continue;
        };
        let Some((id, field)) = rest.split_once('.') else {
            continue;
        };
        let Ok(id) = id.parse::<u32>() else {
            continue;
        };

        let partial = partials.entry(id).or_default();
        match field {
            "type" => partial.device_type = Some(value),
            "link" => partial.link = Some(value),
            "name" => partial.name = Some(value),
            "ipv4.address" => partial.address = Some(value),
            "ipv4.gateway" => partial.gateway = Some(value),
            _ => {}
        }
    }

    for (id, partial) in partials {
        match build_interface(id, partial) {
            Some(iface) => snapshot.interfaces.push(iface),
            None => tracing::warn!(iface_id = id, "Skipping incomplete interface stanza"),
        }
    }

    snapshot
}

fn build_interface(id: u32, partial: PartialInterface) -> Option<Interface> {
    let kind = match partial.device_type.as_deref()? {
        "phys" => InterfaceKind::External,
        "veth" => InterfaceKind::Internal,
        _ => return None,
    };
    let address = partial.address?.parse().ok()?;
    let gateway = match partial.gateway {
        Some(g) => Some(g.parse::<Ipv4Addr>().ok()?),
        None => None,
    };

    Some(Interface {
        id,
        kind,
        link: partial.link.unwrap_or_default(),
        address,
        gateway,
        name: partial
            .name
            .unwrap_or_else(|| crate::types::guest_device_name(id)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(id: u32, kind: InterfaceKind, link: &str, addr: &str, gw: Option<&str>) -> Interface {
        Interface {
            id,
            kind,
            link: link.to_string(),
            address: addr.parse().unwrap(),
            gateway: gw.map(|g| g.parse().unwrap()),
            name: format!("eth{}", id),
        }
    }

    #[test]
    fn test_veth_pair_name() {
        assert_eq!(veth_pair_name("web1"), "vWEB1");
        assert_eq!(veth_pair_name("database-primary"), "vDATABASE-P");
    }

    #[test]
    fn test_internal_stanza_has_no_gateway() {
        let lines = interface_section(
            "web1",
            &iface(1, InterfaceKind::Internal, "lxcbr0", "10.0.2.5", None),
        );

        assert_eq!(
            lines,
            vec![
                "",
                "# internal interface",
                "lxc.net.1.type = veth",
                "lxc.net.1.link = lxcbr0",
                "lxc.net.1.flags = up",
                "lxc.net.1.name = eth1",
                "lxc.net.1.veth.pair = vWEB1",
                "lxc.net.1.ipv4.address = 10.0.2.5",
            ]
        );
    }

    #[test]
    fn test_external_stanza_has_gateway() {
        let lines = interface_section(
            "web1",
            &iface(2, InterfaceKind::External, "eth0", "203.0.113.9", Some("203.0.113.1")),
        );

        assert_eq!(lines[2], "lxc.net.2.type = phys");
        assert_eq!(lines.last().unwrap(), "lxc.net.2.ipv4.gateway = 203.0.113.1");
    }

    #[test]
    fn test_parse_round_trips_written_sections() {
        let mut lines = general_section();
        lines.extend(specific_section(
            "web1",
            "overlay:/lxc/base/rootfs:/lxc/web1/overlay/delta",
        ));
        let internal = iface(1, InterfaceKind::Internal, "lxcbr0", "10.0.2.5", None);
        let external = iface(2, InterfaceKind::External, "eth0", "203.0.113.9", Some("203.0.113.1"));
        lines.extend(interface_section("web1", &internal));
        lines.extend(interface_section("web1", &external));

        let snapshot = parse_config(&lines.join("\n"));

        assert_eq!(
            snapshot.rootfs.as_deref(),
            Some("overlay:/lxc/base/rootfs:/lxc/web1/overlay/delta")
        );
        assert_eq!(snapshot.interfaces, vec![internal, external]);
    }

    #[test]
    fn test_parse_skips_foreign_and_incomplete_stanzas() {
        let content = "\
lxc.include = /usr/share/lxc/config/common.conf
lxc.net.0.type = empty
lxc.net.1.type = veth
lxc.net.1.link = lxcbr0
lxc.net.3.type = veth
lxc.net.3.ipv4.address = 10.0.3.7/24
";
        let snapshot = parse_config(content);

        assert_eq!(snapshot.rootfs, None);
        assert_eq!(snapshot.interfaces.len(), 1);
        assert_eq!(snapshot.interfaces[0].id, 3);
        assert_eq!(snapshot.interfaces[0].name, "eth3");
        assert_eq!(snapshot.interfaces[0].address.to_string(), "10.0.3.7/24");
    }
}
