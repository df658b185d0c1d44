use std::fmt::{self, Debug};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::bundle_system::manager::BundleManager;
use crate::bundle_system::provider::BundleProvider;
use crate::bundle_system::traits::Bundle;
use crate::kernel::error::Result;

/// A [`BundleManager`] behind a single async mutex.
///
/// Every operation locks the whole manager for its duration, so one boot
/// sequence runs at a time. Clones share the same manager.
#[derive(Clone, Default)]
pub struct SharedBundleManager {
    inner: Arc<Mutex<BundleManager>>,
}

impl SharedBundleManager {
    pub fn new() -> Self {
        Self::from_manager(BundleManager::new())
    }

    pub fn from_manager(manager: BundleManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Get reference to the manager Arc<Mutex>
    pub fn manager(&self) -> &Arc<Mutex<BundleManager>> {
        &self.inner
    }

    pub async fn provide(&self, name: &str, provider: Arc<dyn BundleProvider>) -> Result<()> {
        self.inner.lock().await.provide(name, provider)
    }

    pub async fn provide_type(&self, bundle_type: &str, provider: Arc<dyn BundleProvider>) -> Result<()> {
        self.inner.lock().await.provide_type(bundle_type, provider)
    }

    pub async fn provide_multiple<S: AsRef<str>>(
        &self,
        names: &[S],
        provider: Arc<dyn BundleProvider>,
    ) -> Result<()> {
        self.inner.lock().await.provide_multiple(names, provider)
    }

    pub async fn set_bundle(&self, bundle: Arc<dyn Bundle>) {
        self.inner.lock().await.set_bundle(bundle)
    }

    pub async fn get_bundle(&self, name: &str) -> Result<Option<Arc<dyn Bundle>>> {
        self.inner.lock().await.get_bundle(name)
    }

    pub async fn exists(&self, name: &str) -> bool {
        self.inner.lock().await.exists(name)
    }

    pub async fn is_booted(&self, name: &str) -> bool {
        self.inner.lock().await.is_booted(name)
    }

    pub async fn boot(&self, name: &str) -> Result<bool> {
        self.inner.lock().await.boot(name)
    }

    pub async fn uninstall(&self, name: &str) -> Result<bool> {
        self.inner.lock().await.uninstall(name)
    }

    pub async fn shutdown_all(&self) -> Result<()> {
        self.inner.lock().await.shutdown_all()
    }

    pub async fn bundle_ids(&self) -> Vec<String> {
        self.inner.lock().await.bundle_ids()
    }

    pub async fn provider_keys(&self) -> Vec<String> {
        self.inner.lock().await.provider_keys()
    }
}

impl Debug for SharedBundleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Avoid locking in Debug
        f.debug_struct("SharedBundleManager")
            .finish_non_exhaustive()
    }
}
