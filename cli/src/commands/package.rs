use crate::utils::write_stdout;
use clap::Subcommand;
use farm_container::{ContainerError, Provisioner};
use farm_guest::BuildSpec;

#[derive(Subcommand)]
pub enum PackageCommands {
    /// Install packages inside a container
    Install {
        /// Container name
        name: String,

        /// Packages to install
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Remove packages from a container
    Uninstall {
        /// Container name
        name: String,

        /// Packages to remove
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Run a shell command inside a container
    Exec {
        /// Container name
        name: String,

        /// Command to run
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Build a source tree inside a container and install the binary
    Build {
        /// Container name
        name: String,

        /// Source directory inside the guest
        #[arg(long)]
        source: String,

        /// Makefile to build with
        #[arg(long, default_value = "Makefile")]
        makefile: String,

        /// Binary name under <source>/bin
        #[arg(long)]
        binfile: String,

        /// Directory the binary is installed into
        #[arg(long, default_value = "/usr/local/bin")]
        dest: String,
    },
}

pub async fn handle_package_command(
    provisioner: &Provisioner,
    cmd: PackageCommands,
) -> Result<(), ContainerError> {
    match cmd {
        PackageCommands::Install { name, packages } => {
            let container = provisioner.container(&name).await?;
            container.install_packages(&packages).await?;
            println!("Installed {} package(s) in {}", packages.len(), name);
        }
        PackageCommands::Uninstall { name, packages } => {
            let container = provisioner.container(&name).await?;
            container.uninstall_packages(&packages).await?;
            println!("Removed {} package(s) from {}", packages.len(), name);
        }
        PackageCommands::Exec { name, command } => {
            let container = provisioner.container(&name).await?;
            let stdout = container.exec(&command.join(" ")).await?;
            write_stdout(&stdout);
        }
        PackageCommands::Build {
            name,
            source,
            makefile,
            binfile,
            dest,
        } => {
            let build = BuildSpec {
                source,
                makefile,
                binfile,
                dest,
            };
            let container = provisioner.container(&name).await?;
            container.compile_and_install(&build).await?;
            println!("Installed {} into {}", build.binfile, build.dest);
        }
    }

    Ok(())
}
