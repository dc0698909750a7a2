//! `/etc/network/interfaces` scaffolding for ifupdown-style guests.

use crate::error::GuestError;
use farm_exec::{WriteMode, write_lines};
use std::path::{Path, PathBuf};
use tokio::fs;

const DEFAULT_CONFIG: [&str; 4] = [
    "hostname $(hostname)",
    "",
    "auto lo",
    "iface lo inet loopback",
];

fn network_dir(root: &Path) -> PathBuf {
    root.join("etc").join("network")
}

pub(crate) fn interfaces_path(root: &Path) -> PathBuf {
    network_dir(root).join("interfaces")
}

/// Creates `etc/network/interfaces` with the loopback stanza if the
/// directory does not exist yet.
pub(crate) async fn write_default(root: &Path) -> Result<bool, GuestError> {
    let dir = network_dir(root);
    if fs::try_exists(&dir).await? {
        return Ok(false);
    }

    fs::create_dir_all(&dir).await?;
    write_lines(&interfaces_path(root), &DEFAULT_CONFIG, WriteMode::Truncate).await?;

    tracing::debug!(root = ?root, "Wrote default guest network config");
    Ok(true)
}

pub(crate) async fn append_interface(root: &Path, iface_name: &str) -> Result<(), GuestError> {
    write_default(root).await?;

    let stanza = [
        String::new(),
        format!("auto {}", iface_name),
        format!("iface {} inet manual", iface_name),
    ];
    write_lines(&interfaces_path(root), &stanza, WriteMode::Append).await?;
    Ok(())
}
