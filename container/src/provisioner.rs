use crate::base::BaseImageManager;
use crate::container::{Capabilities, Container};
use crate::error::ContainerError;
use farm_guest::GuestPersona;
use farm_runtime::{LxcConfig, RuntimeBackend, State};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Hands out container handles, cloning containers into existence on demand.
pub struct Provisioner {
    caps: Arc<Capabilities>,
    base: BaseImageManager,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Provisioner {
    pub fn new(
        backend: Arc<dyn RuntimeBackend>,
        persona: Arc<dyn GuestPersona>,
        config: &LxcConfig,
    ) -> Self {
        let caps = Arc::new(Capabilities {
            backend,
            persona,
            bridge: config.bridge.clone(),
        });
        let base = BaseImageManager::new(&config.base_name, caps.clone());

        Self {
            caps,
            base,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_manager(&self) -> &BaseImageManager {
        &self.base
    }

    pub async fn base(&self) -> Result<Container, ContainerError> {
        self.base.get_or_create().await
    }

    async fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Returns a handle for `name`, cloning it from the base if it does not
    /// exist yet.
    ///
    /// A newly cloned container starts with no interfaces. An existing one
    /// gets its interfaces and rootfs kind from its config on disk.
    ///
    /// Creation is not rolled back: if a step after the clone fails, the
    /// container is left partially configured.
    pub async fn container(&self, name: &str) -> Result<Container, ContainerError> {
        if name == self.base.name() {
            return self.base().await;
        }

        let lock = self.lock_for(name).await;
        let _guard = lock.lock().await;
        let backend = self.caps.backend.as_ref();

        match backend.state(name).await? {
            State::NotExists => {
                let base = self.base().await?;

                tracing::info!(container = %name, base = %base.name(), "Creating container");
                backend.clone_container(base.name(), name).await?;
                backend.write_default_config(name).await?;
                backend.write_specific_config(name, true).await?;

                Ok(Container::new(
                    name,
                    true,
                    Vec::new(),
                    self.caps.clone(),
                    lock.clone(),
                ))
            }
            state => {
                if state == State::Error {
                    tracing::warn!(container = %name, "Container state is indeterminate");
                }
                let snapshot = backend.read_config(name).await?;
                Ok(Container::from_snapshot(
                    name,
                    true,
                    snapshot,
                    self.caps.clone(),
                    lock.clone(),
                ))
            }
        }
    }
}
