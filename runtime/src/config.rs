use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LXC_PATH: &str = "/var/lib/lxc";
pub const DEFAULT_BASE_NAME: &str = "base";
pub const DEFAULT_BRIDGE: &str = "lxcbr0";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Host-level settings for the LXC backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LxcConfig {
    /// Directory holding one subdirectory per container.
    pub lxc_path: PathBuf,
    /// Name of the container every other container is cloned from.
    pub base_name: String,
    /// Host bridge that internal interfaces attach to.
    pub bridge: String,
    /// Upper bound for any single external command.
    pub command_timeout_secs: u64,
}

impl Default for LxcConfig {
    fn default() -> Self {
        Self {
            lxc_path: PathBuf::from(DEFAULT_LXC_PATH),
            base_name: DEFAULT_BASE_NAME.to_string(),
            bridge: DEFAULT_BRIDGE.to_string(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

impl LxcConfig {
    pub fn with_lxc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lxc_path = path.into();
        self
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn container_dir(&self, name: &str) -> PathBuf {
        self.lxc_path.join(name)
    }

    pub fn config_path(&self, name: &str) -> PathBuf {
        self.container_dir(name).join("config")
    }

    pub fn rootfs_dir(&self, name: &str) -> PathBuf {
        self.container_dir(name).join("rootfs")
    }

    pub fn delta_dir(&self, name: &str) -> PathBuf {
        self.container_dir(name).join("overlay").join("delta")
    }

    pub fn lxc_path(&self) -> &Path {
        &self.lxc_path
    }
}
