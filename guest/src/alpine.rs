use crate::config::AlpineConfig;
use crate::error::GuestError;
use crate::ifupdown;
use crate::persona::{GuestPersona, join_quoted, shell_quote};
use async_trait::async_trait;
use farm_runtime::{GuestTemplate, RuntimeBackend};
use std::path::Path;

/// Alpine Linux guests: `apk` packages and ifupdown networking.
pub struct AlpinePersona {
    config: AlpineConfig,
}

impl AlpinePersona {
    pub fn new(config: AlpineConfig) -> Self {
        Self { config }
    }

    /// Shell chain run inside a freshly created base container.
    fn setup_command(&self) -> String {
        let mut steps = vec!["apk update".to_string()];

        if !self.config.base_packages.is_empty() {
            steps.push(format!(
                "apk add --no-cache {}",
                join_quoted(&self.config.base_packages)
            ));
        }

        if let Some(password) = &self.config.root_password {
            steps.push(format!(
                "echo {} | chpasswd",
                shell_quote(&format!("root:{}", password))
            ));
        }

        if !self.config.nameservers.is_empty() {
            let lines: Vec<String> = self
                .config
                .nameservers
                .iter()
                .map(|ns| format!("nameserver {}", ns))
                .collect();
            steps.push(format!(
                "printf '%s\\n' {} > /etc/resolv.conf",
                join_quoted(&lines)
            ));
        }

        steps.join(" && ")
    }
}

impl Default for AlpinePersona {
    fn default() -> Self {
        Self::new(AlpineConfig::default())
    }
}

#[async_trait]
impl GuestPersona for AlpinePersona {
    fn template(&self) -> GuestTemplate {
        GuestTemplate {
            distribution: "alpine".to_string(),
            release: self.config.release.clone(),
            arch: self.config.arch.clone(),
        }
    }

    async fn bootstrap(&self, backend: &dyn RuntimeBackend, name: &str) -> Result<(), GuestError> {
        tracing::info!(container = %name, release = %self.config.release, "Bootstrapping Alpine base");

        backend.create(name, &self.template()).await?;

        // Setup runs with the network config the template shipped with;
        // the container's own config replaces it afterwards.
        backend.start(name).await?;
        self.exec(backend, name, &self.setup_command()).await?;
        backend.stop(name).await?;

        backend.write_default_config(name).await?;
        backend.write_specific_config(name, false).await?;

        tracing::info!(container = %name, "Alpine base ready");
        Ok(())
    }

    fn install_command(&self, packages: &[String]) -> String {
        format!("apk update && apk add --no-cache {}", join_quoted(packages))
    }

    fn uninstall_command(&self, packages: &[String]) -> String {
        format!("apk del --purge {}", join_quoted(packages))
    }

    async fn write_default_network_config(&self, root: &Path) -> Result<bool, GuestError> {
        ifupdown::write_default(root).await
    }

    async fn write_interface_config(
        &self,
        root: &Path,
        iface_name: &str,
    ) -> Result<(), GuestError> {
        ifupdown::append_interface(root, iface_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::BuildSpec;
    use farm_runtime::testing::FakeLxc;
    use farm_runtime::{LxcBackend, LxcConfig, State};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn packages(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn sh(command: &str) -> Vec<String> {
        vec!["/bin/sh".to_string(), "-c".to_string(), command.to_string()]
    }

    #[test]
    fn test_package_commands() {
        let persona = AlpinePersona::default();

        assert_eq!(
            persona.install_command(&packages(&["nginx", "curl"])),
            "apk update && apk add --no-cache nginx curl"
        );
        assert_eq!(
            persona.uninstall_command(&packages(&["nginx"])),
            "apk del --purge nginx"
        );
    }

    #[test]
    fn test_setup_command() {
        let persona = AlpinePersona::new(AlpineConfig {
            base_packages: packages(&["openrc", "ca-certificates"]),
            nameservers: packages(&["1.1.1.1", "9.9.9.9"]),
            root_password: Some("s3cret".to_string()),
            ..AlpineConfig::default()
        });

        assert_eq!(
            persona.setup_command(),
            "apk update && apk add --no-cache openrc ca-certificates && \
             echo root:s3cret | chpasswd && \
             printf '%s\\n' 'nameserver 1.1.1.1' 'nameserver 9.9.9.9' > /etc/resolv.conf"
        );
    }

    #[tokio::test]
    async fn test_bootstrap_creates_plain_rootfs_base() {
        let dir = TempDir::new().unwrap();
        let lxc = Arc::new(FakeLxc::new());
        let backend = LxcBackend::new(lxc.clone(), LxcConfig::default().with_lxc_path(dir.path()));
        let persona = AlpinePersona::default();

        persona.bootstrap(&backend, "base").await.unwrap();

        assert_eq!(backend.state("base").await.unwrap(), State::Stopped);
        let create = lxc.calls_for("lxc-create").remove(0);
        assert_eq!(create.flag_value("-d"), Some("alpine"));
        assert_eq!(create.flag_value("-r"), Some("3.19"));
        assert_eq!(lxc.attached("base"), vec![sh(&persona.setup_command())]);

        let config = std::fs::read_to_string(dir.path().join("base/config")).unwrap();
        assert!(config.starts_with("# general\n"));
        assert!(config.contains(&format!(
            "lxc.rootfs.path = dir:{}/base/rootfs\n",
            dir.path().display()
        )));
    }

    #[tokio::test]
    async fn test_install_runs_through_shell() {
        let dir = TempDir::new().unwrap();
        let lxc = Arc::new(FakeLxc::new());
        lxc.add_container("web1", "RUNNING");
        let backend = LxcBackend::new(lxc.clone(), LxcConfig::default().with_lxc_path(dir.path()));
        let persona = AlpinePersona::default();

        persona
            .install_packages(&backend, "web1", &packages(&["nginx"]))
            .await
            .unwrap();
        persona
            .install_packages(&backend, "web1", &[])
            .await
            .unwrap();
        persona
            .uninstall_packages(&backend, "web1", &packages(&["nginx"]))
            .await
            .unwrap();

        assert_eq!(
            lxc.attached("web1"),
            vec![
                sh("apk update && apk add --no-cache nginx"),
                sh("apk del --purge nginx"),
            ]
        );
    }

    #[tokio::test]
    async fn test_compile_and_install() {
        let dir = TempDir::new().unwrap();
        let lxc = Arc::new(FakeLxc::new());
        lxc.add_container("web1", "RUNNING");
        let backend = LxcBackend::new(lxc.clone(), LxcConfig::default().with_lxc_path(dir.path()));
        let persona = AlpinePersona::default();

        let build = BuildSpec {
            source: "/opt/src/app".to_string(),
            makefile: "Makefile".to_string(),
            binfile: "app".to_string(),
            dest: "/usr/local/bin".to_string(),
        };
        persona
            .compile_and_install(&backend, "web1", &build)
            .await
            .unwrap();

        assert_eq!(
            lxc.attached("web1"),
            vec![sh(
                "make -C /opt/src/app -f Makefile && mv /opt/src/app/bin/app /usr/local/bin && \
                 chmod +x /usr/local/bin/app && rm -rf /opt/src/app"
            )]
        );
    }
}
