use clap::Args;
use farm_guest::AlpineConfig;
use farm_runtime::LxcConfig;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct HostArgs {
    /// Directory holding the LXC containers
    #[arg(long, global = true, env = "FARM_LXC_PATH", default_value = "/var/lib/lxc")]
    pub lxc_path: PathBuf,

    /// Name of the base container others are cloned from
    #[arg(long, global = true, env = "FARM_BASE_NAME", default_value = "base")]
    pub base_name: String,

    /// Host bridge for internal interfaces
    #[arg(long, global = true, env = "FARM_BRIDGE", default_value = "lxcbr0")]
    pub bridge: String,

    /// Timeout in seconds for each external command
    #[arg(long, global = true, env = "FARM_TIMEOUT", default_value_t = 300)]
    pub timeout: u64,

    /// Alpine release used to bootstrap the base container
    #[arg(long, global = true, env = "FARM_ALPINE_RELEASE", default_value = "3.19")]
    pub alpine_release: String,

    /// Architecture used to bootstrap the base container
    #[arg(long, global = true, env = "FARM_ARCH", default_value = "amd64")]
    pub arch: String,

    /// Root password set in the base container
    #[arg(long, global = true, env = "FARM_ROOT_PASSWORD", hide_env_values = true)]
    pub root_password: Option<String>,

    /// Nameserver written to the base container's resolv.conf (repeatable)
    #[arg(long = "nameserver", global = true, default_value = "1.1.1.1")]
    pub nameservers: Vec<String>,

    /// Package installed into the base container (repeatable)
    #[arg(long = "base-package", global = true, default_value = "ca-certificates")]
    pub base_packages: Vec<String>,
}

impl HostArgs {
    pub fn lxc_config(&self) -> LxcConfig {
        LxcConfig {
            lxc_path: self.lxc_path.clone(),
            base_name: self.base_name.clone(),
            bridge: self.bridge.clone(),
            command_timeout_secs: self.timeout,
        }
    }

    pub fn alpine_config(&self) -> AlpineConfig {
        AlpineConfig {
            release: self.alpine_release.clone(),
            arch: self.arch.clone(),
            base_packages: self.base_packages.clone(),
            nameservers: self.nameservers.clone(),
            root_password: self.root_password.clone(),
        }
    }
}
