use crate::error::RuntimeError;
use crate::state::State;
use crate::types::*;
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Lifecycle verbs and config generation for one container runtime.
#[async_trait]
pub trait RuntimeBackend: Send + Sync {
    /// Raw status token reported by the runtime, or `None` if the container
    /// does not exist.
    async fn raw_state(&self, name: &str) -> Result<Option<String>, RuntimeError>;

    async fn state(&self, name: &str) -> Result<State, RuntimeError> {
        let raw = self.raw_state(name).await?;
        Ok(State::from_raw(raw.as_deref()))
    }

    async fn start(&self, name: &str) -> Result<(), RuntimeError>;

    async fn stop(&self, name: &str) -> Result<(), RuntimeError>;

    /// Runs `argv` inside the container, starting it first if stopped.
    async fn exec(&self, name: &str, argv: &[String]) -> Result<Vec<u8>, RuntimeError>;

    /// Copy-on-write clone of `base` into a new container `target`.
    async fn clone_container(&self, base: &str, target: &str) -> Result<(), RuntimeError>;

    /// Creates a fresh container from a distribution template.
    async fn create(&self, name: &str, template: &GuestTemplate) -> Result<(), RuntimeError>;

    async fn write_default_config(&self, name: &str) -> Result<(), RuntimeError>;

    async fn write_specific_config(&self, name: &str, cloned: bool) -> Result<(), RuntimeError>;

    /// Appends interface stanza `id` and returns the resulting record.
    ///
    /// For external interfaces a missing gateway is derived from `address`.
    async fn write_interface_config(
        &self,
        name: &str,
        id: u32,
        kind: InterfaceKind,
        link: &str,
        address: InterfaceAddress,
        gateway: Option<Ipv4Addr>,
    ) -> Result<Interface, RuntimeError>;

    /// Host path of the container's writable root filesystem.
    fn guest_root(&self, name: &str, cloned: bool) -> PathBuf;

    /// Parses the container's config, or `None` if it has none on disk.
    async fn read_config(&self, name: &str) -> Result<Option<ConfigSnapshot>, RuntimeError>;
}
