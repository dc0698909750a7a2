use crate::container::{Capabilities, Container};
use crate::error::ContainerError;
use farm_runtime::State;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns the single base container every other container is cloned from.
pub struct BaseImageManager {
    name: String,
    caps: Arc<Capabilities>,
    /// Held across check-then-bootstrap; also the base's config-write lock.
    lock: Arc<Mutex<()>>,
}

impl BaseImageManager {
    pub(crate) fn new(name: &str, caps: Arc<Capabilities>) -> Self {
        Self {
            name: name.to_string(),
            caps,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the base container, bootstrapping it first if it does not
    /// exist. Concurrent callers wait for a single bootstrap.
    pub async fn get_or_create(&self) -> Result<Container, ContainerError> {
        let _guard = self.lock.lock().await;
        let backend = self.caps.backend.as_ref();

        match backend.state(&self.name).await? {
            State::NotExists => {
                tracing::info!(base = %self.name, "Base container missing, bootstrapping");
                self.caps.persona.bootstrap(backend, &self.name).await?;
                Ok(Container::new(
                    &self.name,
                    false,
                    Vec::new(),
                    self.caps.clone(),
                    self.lock.clone(),
                ))
            }
            state => {
                if state == State::Error {
                    tracing::warn!(base = %self.name, "Base container state is indeterminate");
                }
                let interfaces = backend
                    .read_config(&self.name)
                    .await?
                    .map(|snapshot| snapshot.interfaces)
                    .unwrap_or_default();
                Ok(Container::new(
                    &self.name,
                    false,
                    interfaces,
                    self.caps.clone(),
                    self.lock.clone(),
                ))
            }
        }
    }
}
