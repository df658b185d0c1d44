use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::bundle_system::{Application, Bundle, LibraryProvider, SharedBundleManager};
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::storage::config::{ConfigData, ConfigFormat};

/// Host configuration: where libraries live, which applications exist and
/// what to boot on start.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    /// Roots scanned for library bundles
    #[serde(default)]
    pub library_dirs: Vec<PathBuf>,
    /// Identifiers booted, in order, by [`Kernel::start`]
    #[serde(default)]
    pub boot: Vec<String>,
    /// One settings table per application bundle
    #[serde(default)]
    pub apps: Vec<Value>,
}

impl HostConfig {
    /// Load a host configuration file. Relative library directories are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: HostConfig = ConfigFormat::load_file(path)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for dir in &mut self.library_dirs {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}

/// Result of booting one identifier during [`Kernel::start`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootOutcome {
    pub identifier: String,
    /// False when no bundle or provider was known for the identifier
    pub found: bool,
}

/// Host that owns a shared bundle manager and boots configured bundles.
#[derive(Debug, Clone, Default)]
pub struct Kernel {
    manager: SharedBundleManager,
    autoboot: Vec<String>,
}

impl Kernel {
    /// A kernel with an empty manager and nothing to boot
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a kernel from a host configuration: registers a library provider
    /// for the configured roots and every configured application.
    pub async fn from_config(config: &HostConfig) -> Result<Self> {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        let kernel = Self {
            manager: SharedBundleManager::new(),
            autoboot: config.boot.clone(),
        };

        {
            let mut manager = kernel.manager.manager().lock().await;

            if !config.library_dirs.is_empty() {
                let provider = LibraryProvider::new(config.library_dirs.clone());
                let ids = provider.register(&mut *manager)?;
                log::info!("Registered {} libraries", ids.len());
            }

            for settings in &config.apps {
                let app = Application::new(ConfigData::from_value(settings.clone())?)?;
                log::info!("Registered application '{}'", app.identifier());
                manager.set_bundle(Arc::new(app));
            }
        }

        Ok(kernel)
    }

    pub fn manager(&self) -> &SharedBundleManager {
        &self.manager
    }

    /// Identifiers booted by [`Kernel::start`]
    pub fn autoboot(&self) -> &[String] {
        &self.autoboot
    }

    /// Boot every configured identifier in order. Stops at the first error.
    pub async fn start(&self) -> Result<Vec<BootOutcome>> {
        let mut outcomes = Vec::with_capacity(self.autoboot.len());
        for identifier in &self.autoboot {
            let found = self.manager.boot(identifier).await?;
            if found {
                log::info!("Booted '{}'", identifier);
            } else {
                log::warn!("Bundle '{}' not found", identifier);
            }
            outcomes.push(BootOutcome {
                identifier: identifier.clone(),
                found,
            });
        }
        Ok(outcomes)
    }

    /// Shut down every booted bundle
    pub async fn shutdown(&self) -> Result<()> {
        log::info!("Shutting down {}", constants::APP_NAME);
        self.manager.shutdown_all().await
    }
}
