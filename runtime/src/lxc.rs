use crate::backend::RuntimeBackend;
use crate::config::LxcConfig;
use crate::config_file;
use crate::error::RuntimeError;
use crate::state::State;
use crate::types::*;
use async_trait::async_trait;
use farm_exec::{CommandRunner, CommandSpec, ExecError, WriteMode, parse_key_values, write_lines};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

/// Runtime backend driving the `lxc-*` command line tools.
pub struct LxcBackend {
    runner: Arc<dyn CommandRunner>,
    config: LxcConfig,
}

impl LxcBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, config: LxcConfig) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &LxcConfig {
        &self.config
    }

    fn lxc(&self, tool: &str, name: &str) -> CommandSpec {
        CommandSpec::new(tool)
            .arg("-P")
            .arg(self.config.lxc_path.to_string_lossy())
            .arg("-n")
            .arg(name)
    }

    async fn run(
        &self,
        op: &'static str,
        name: &str,
        command: CommandSpec,
    ) -> Result<Vec<u8>, RuntimeError> {
        self.runner
            .run(&command)
            .await
            .map_err(|source| RuntimeError::Command {
                op,
                name: name.to_string(),
                source,
            })
    }

    /// `lxc.rootfs.path` value for a container.
    pub fn rootfs_directive(&self, name: &str, cloned: bool) -> String {
        match RootfsKind::for_cloned(cloned) {
            RootfsKind::Overlay => format!(
                "overlay:{}:{}",
                self.config.rootfs_dir(&self.config.base_name).display(),
                self.config.delta_dir(name).display()
            ),
            RootfsKind::Dir => format!("dir:{}", self.config.rootfs_dir(name).display()),
        }
    }
}

/// `lxc-info` on an unknown container fails with "<name> doesn't exist".
fn is_missing_container(err: &ExecError) -> bool {
    err.stderr()
        .is_some_and(|s| s.contains("doesn't exist") || s.contains("does not exist"))
}

#[async_trait]
impl RuntimeBackend for LxcBackend {
    async fn raw_state(&self, name: &str) -> Result<Option<String>, RuntimeError> {
        let command = self.lxc("lxc-info", name);

        match self.runner.run(&command).await {
            Ok(output) => {
                if output.iter().all(u8::is_ascii_whitespace) {
                    return Ok(None);
                }
                let info = parse_key_values(&output);
                Ok(Some(info.get("State").cloned().unwrap_or_default()))
            }
            Err(e) if is_missing_container(&e) => Ok(None),
            Err(source) => Err(RuntimeError::Inspect {
                name: name.to_string(),
                source,
            }),
        }
    }

    async fn start(&self, name: &str) -> Result<(), RuntimeError> {
        if self.state(name).await? == State::Running {
            return Ok(());
        }

        self.run("start", name, self.lxc("lxc-start", name)).await?;
        tracing::info!(container = %name, "Container started");
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        if self.state(name).await? == State::Stopped {
            return Ok(());
        }

        self.run("stop", name, self.lxc("lxc-stop", name)).await?;
        tracing::info!(container = %name, "Container stopped");
        Ok(())
    }

    async fn exec(&self, name: &str, argv: &[String]) -> Result<Vec<u8>, RuntimeError> {
        if self.state(name).await? == State::Stopped {
            tracing::debug!(container = %name, "Waking stopped container for exec");
            self.start(name).await?;
        }

        let command = self
            .lxc("lxc-attach", name)
            .arg("--clear-env")
            .arg("--")
            .args(argv.iter().cloned());

        self.run("exec in", name, command).await
    }

    async fn clone_container(&self, base: &str, target: &str) -> Result<(), RuntimeError> {
        if self.state(target).await? != State::NotExists {
            return Err(RuntimeError::AlreadyExists(target.to_string()));
        }

        if self.state(base).await? == State::Running {
            self.stop(base).await?;
        }

        let command = self
            .lxc("lxc-copy", base)
            .args(["-N", target, "-B", "overlayfs", "-s"]);
        self.run("clone", target, command).await?;

        tracing::info!(base = %base, container = %target, "Container cloned from base");
        Ok(())
    }

    async fn create(&self, name: &str, template: &GuestTemplate) -> Result<(), RuntimeError> {
        if self.state(name).await? != State::NotExists {
            return Err(RuntimeError::AlreadyExists(name.to_string()));
        }

        let command = self.lxc("lxc-create", name).args([
            "-t",
            "download",
            "--",
            "-d",
            template.distribution.as_str(),
            "-r",
            template.release.as_str(),
            "-a",
            template.arch.as_str(),
        ]);
        self.run("create", name, command).await?;

        tracing::info!(
            container = %name,
            distribution = %template.distribution,
            release = %template.release,
            "Container created from template"
        );
        Ok(())
    }

    async fn write_default_config(&self, name: &str) -> Result<(), RuntimeError> {
        write_lines(
            &self.config.config_path(name),
            &config_file::general_section(),
            WriteMode::Truncate,
        )
        .await?;
        Ok(())
    }

    async fn write_specific_config(&self, name: &str, cloned: bool) -> Result<(), RuntimeError> {
        let directive = self.rootfs_directive(name, cloned);
        write_lines(
            &self.config.config_path(name),
            &config_file::specific_section(name, &directive),
            WriteMode::Append,
        )
        .await?;
        Ok(())
    }

    async fn write_interface_config(
        &self,
        name: &str,
        id: u32,
        kind: InterfaceKind,
        link: &str,
        address: InterfaceAddress,
        gateway: Option<Ipv4Addr>,
    ) -> Result<Interface, RuntimeError> {
        let gateway = match kind {
            InterfaceKind::External => Some(gateway.unwrap_or_else(|| address.default_gateway())),
            InterfaceKind::Internal => None,
        };

        let iface = Interface {
            id,
            kind,
            link: link.to_string(),
            address,
            gateway,
            name: guest_device_name(id),
        };

        write_lines(
            &self.config.config_path(name),
            &config_file::interface_section(name, &iface),
            WriteMode::Append,
        )
        .await?;

        tracing::debug!(container = %name, iface = %iface.name, kind = %kind, "Interface stanza written");
        Ok(iface)
    }

    fn guest_root(&self, name: &str, cloned: bool) -> PathBuf {
        match RootfsKind::for_cloned(cloned) {
            RootfsKind::Overlay => self.config.delta_dir(name),
            RootfsKind::Dir => self.config.rootfs_dir(name),
        }
    }

    async fn read_config(&self, name: &str) -> Result<Option<ConfigSnapshot>, RuntimeError> {
        match fs::read_to_string(self.config.config_path(name)).await {
            Ok(content) => Ok(Some(config_file::parse_config(&content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
