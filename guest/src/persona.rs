use crate::error::GuestError;
use async_trait::async_trait;
use farm_runtime::{GuestTemplate, RuntimeBackend};
use std::path::Path;

/// Sources to build inside the guest and the binary to keep afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    /// Source tree inside the guest. Removed after a successful build.
    pub source: String,
    pub makefile: String,
    /// Name of the built binary under `<source>/bin`.
    pub binfile: String,
    /// Directory the binary is moved to.
    pub dest: String,
}

/// Knowledge of one guest OS: its package manager, shell and file layout.
///
/// Anything that has to run inside the container goes through the runtime
/// backend passed in by the caller.
#[async_trait]
pub trait GuestPersona: Send + Sync {
    /// Distribution image the base container is created from.
    fn template(&self) -> GuestTemplate;

    /// Installs the guest OS into a fresh base container `name`.
    async fn bootstrap(&self, backend: &dyn RuntimeBackend, name: &str) -> Result<(), GuestError>;

    /// Argument vector that runs `command` through the guest's shell.
    fn shell_argv(&self, command: &str) -> Vec<String> {
        vec!["/bin/sh".to_string(), "-c".to_string(), command.to_string()]
    }

    fn install_command(&self, packages: &[String]) -> String;

    fn uninstall_command(&self, packages: &[String]) -> String;

    async fn exec(
        &self,
        backend: &dyn RuntimeBackend,
        name: &str,
        command: &str,
    ) -> Result<Vec<u8>, GuestError> {
        let argv = self.shell_argv(command);
        Ok(backend.exec(name, &argv).await?)
    }

    async fn install_packages(
        &self,
        backend: &dyn RuntimeBackend,
        name: &str,
        packages: &[String],
    ) -> Result<(), GuestError> {
        if packages.is_empty() {
            return Ok(());
        }
        tracing::info!(container = %name, ?packages, "Installing packages");
        self.exec(backend, name, &self.install_command(packages))
            .await?;
        Ok(())
    }

    async fn uninstall_packages(
        &self,
        backend: &dyn RuntimeBackend,
        name: &str,
        packages: &[String],
    ) -> Result<(), GuestError> {
        if packages.is_empty() {
            return Ok(());
        }
        tracing::info!(container = %name, ?packages, "Uninstalling packages");
        self.exec(backend, name, &self.uninstall_command(packages))
            .await?;
        Ok(())
    }

    /// Builds `build.source` with make and installs the resulting binary.
    async fn compile_and_install(
        &self,
        backend: &dyn RuntimeBackend,
        name: &str,
        build: &BuildSpec,
    ) -> Result<(), GuestError> {
        let source = shell_quote(&build.source);
        let binary = shell_quote(&format!("{}/bin/{}", build.source, build.binfile));
        let installed = shell_quote(&format!("{}/{}", build.dest, build.binfile));
        let steps = [
            format!("make -C {} -f {}", source, shell_quote(&build.makefile)),
            format!("mv {} {}", binary, shell_quote(&build.dest)),
            format!("chmod +x {}", installed),
            format!("rm -rf {}", source),
        ];
        self.exec(backend, name, &steps.join(" && ")).await?;
        Ok(())
    }

    /// Writes the guest's base network config under `root` unless it is
    /// already there. Returns whether anything was written.
    async fn write_default_network_config(&self, root: &Path) -> Result<bool, GuestError>;

    /// Declares `iface_name` in the guest network config under `root`.
    async fn write_interface_config(&self, root: &Path, iface_name: &str)
    -> Result<(), GuestError>;
}

/// Quotes `word` for a POSIX shell. Safe words are returned unchanged.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

pub(crate) fn join_quoted(words: &[String]) -> String {
    words
        .iter()
        .map(|w| shell_quote(w))
        .collect::<Vec<_>>()
        .join(" ")
}
