use crate::error::ContainerError;
use crate::interface::InterfaceRequest;
use farm_guest::{BuildSpec, GuestPersona};
use farm_runtime::{
    ConfigSnapshot, Interface, InterfaceAddress, InterfaceKind, RootfsKind, RuntimeBackend, State,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The two capabilities every container handle is composed of.
pub(crate) struct Capabilities {
    pub backend: Arc<dyn RuntimeBackend>,
    pub persona: Arc<dyn GuestPersona>,
    pub bridge: String,
}

/// Handle to one provisioned container.
///
/// State is never cached: every query goes to the runtime.
pub struct Container {
    name: String,
    cloned: bool,
    interfaces: Vec<Interface>,
    caps: Arc<Capabilities>,
    /// Serializes config writes with every other handle for this name.
    lock: Arc<Mutex<()>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContainerSummary {
    pub name: String,
    pub state: State,
    pub cloned: bool,
    pub rootfs: RootfsKind,
    pub interfaces: Vec<Interface>,
}

impl Container {
    pub(crate) fn new(
        name: &str,
        cloned: bool,
        interfaces: Vec<Interface>,
        caps: Arc<Capabilities>,
        lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            cloned,
            interfaces,
            caps,
            lock,
        }
    }

    /// Handle for an existing container, described by its on-disk config.
    pub(crate) fn from_snapshot(
        name: &str,
        default_cloned: bool,
        snapshot: Option<ConfigSnapshot>,
        caps: Arc<Capabilities>,
        lock: Arc<Mutex<()>>,
    ) -> Self {
        let Some(snapshot) = snapshot else {
            tracing::warn!(container = %name, "Container has no config on disk");
            return Self::new(name, default_cloned, Vec::new(), caps, lock);
        };

        let cloned = snapshot
            .rootfs_kind()
            .map_or(default_cloned, |kind| kind == RootfsKind::Overlay);
        Self::new(name, cloned, snapshot.interfaces, caps, lock)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this container was cloned from the base.
    pub fn is_cloned(&self) -> bool {
        self.cloned
    }

    pub fn rootfs_kind(&self) -> RootfsKind {
        RootfsKind::for_cloned(self.cloned)
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    pub async fn state(&self) -> Result<State, ContainerError> {
        Ok(self.caps.backend.state(&self.name).await?)
    }

    pub async fn start(&self) -> Result<(), ContainerError> {
        Ok(self.caps.backend.start(&self.name).await?)
    }

    pub async fn stop(&self) -> Result<(), ContainerError> {
        Ok(self.caps.backend.stop(&self.name).await?)
    }

    /// Address of the single internal interface.
    pub fn ip(&self) -> Result<InterfaceAddress, ContainerError> {
        let internal: Vec<&Interface> = self
            .interfaces
            .iter()
            .filter(|iface| iface.kind == InterfaceKind::Internal)
            .collect();

        match internal.as_slice() {
            [iface] => Ok(iface.address),
            other => Err(ContainerError::InternalInterfaceCount(other.len())),
        }
    }

    /// Attaches a new interface: backend config stanza first, then the
    /// guest's own network config inside the container rootfs.
    pub async fn add_interface(
        &mut self,
        request: InterfaceRequest,
    ) -> Result<Interface, ContainerError> {
        let link = request.resolve_link(&self.caps.bridge)?;

        let _guard = self.lock.lock().await;
        let backend = &self.caps.backend;

        // Another handle may have attached interfaces since this one was made.
        if let Some(snapshot) = backend.read_config(&self.name).await? {
            self.interfaces = snapshot.interfaces;
        }

        let id = self.interfaces.len() as u32 + 1;
        let iface = backend
            .write_interface_config(
                &self.name,
                id,
                request.kind,
                &link,
                request.address,
                request.gateway,
            )
            .await?;

        let root = backend.guest_root(&self.name, self.cloned);
        self.caps
            .persona
            .write_interface_config(&root, &iface.name)
            .await?;

        tracing::info!(
            container = %self.name,
            iface = %iface.name,
            kind = %iface.kind,
            link = %iface.link,
            address = %iface.address,
            "Interface attached"
        );

        self.interfaces.push(iface.clone());
        Ok(iface)
    }

    pub async fn install_packages(&self, packages: &[String]) -> Result<(), ContainerError> {
        let backend = self.caps.backend.as_ref();
        Ok(self
            .caps
            .persona
            .install_packages(backend, &self.name, packages)
            .await?)
    }

    pub async fn uninstall_packages(&self, packages: &[String]) -> Result<(), ContainerError> {
        let backend = self.caps.backend.as_ref();
        Ok(self
            .caps
            .persona
            .uninstall_packages(backend, &self.name, packages)
            .await?)
    }

    /// Runs a shell command inside the container and returns its stdout.
    pub async fn exec(&self, command: &str) -> Result<Vec<u8>, ContainerError> {
        let backend = self.caps.backend.as_ref();
        Ok(self.caps.persona.exec(backend, &self.name, command).await?)
    }

    pub async fn compile_and_install(&self, build: &BuildSpec) -> Result<(), ContainerError> {
        let backend = self.caps.backend.as_ref();
        Ok(self
            .caps
            .persona
            .compile_and_install(backend, &self.name, build)
            .await?)
    }

    pub async fn summary(&self) -> Result<ContainerSummary, ContainerError> {
        Ok(ContainerSummary {
            name: self.name.clone(),
            state: self.state().await?,
            cloned: self.cloned,
            rootfs: self.rootfs_kind(),
            interfaces: self.interfaces.clone(),
        })
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("cloned", &self.cloned)
            .field("interfaces", &self.interfaces)
            .finish()
    }
}
