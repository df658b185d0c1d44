use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::info;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::bundle_system::error::BundleSystemError;
use crate::bundle_system::traits::{Bundle, BundleIdentity};
use crate::kernel::component::ComponentRegistry;
use crate::kernel::constants::APP_BUNDLE_TYPE;
use crate::kernel::error::Result;
use crate::storage::config::ConfigData;

/// Extension points of an [`Application`]. Both hooks default to no-ops.
pub trait ApplicationHooks: Send + Sync {
    /// Called at the end of construction
    fn on_init(&self, _app: &Application) -> Result<()> {
        Ok(())
    }

    /// Called at the end of a successful `boot()`
    fn on_boot(&self, _app: &Application) -> Result<()> {
        Ok(())
    }
}

struct NoHooks;

impl ApplicationHooks for NoHooks {}

/// A bundle of type `"app"` wrapping a configuration store and a named
/// component registry.
///
/// The name comes from the config's `"name"` entry and is fixed at
/// construction, as are the optional `"dependencies"` and `"overrides"` lists.
/// An application boots once; a second `boot()` is rejected.
pub struct Application {
    identity: BundleIdentity,
    dependencies: Vec<String>,
    overrides: Vec<String>,
    config: RwLock<ConfigData>,
    components: RwLock<ComponentRegistry>,
    booted: AtomicBool,
    hooks: Box<dyn ApplicationHooks>,
}

impl Application {
    /// Create an application with a fresh component registry
    pub fn new(config: ConfigData) -> Result<Self> {
        Self::build(config, ComponentRegistry::new(), Box::new(NoHooks))
    }

    /// Create an application around an existing component registry
    pub fn with_registry(config: ConfigData, registry: ComponentRegistry) -> Result<Self> {
        Self::build(config, registry, Box::new(NoHooks))
    }

    /// Create an application with lifecycle hooks
    pub fn with_hooks<H>(config: ConfigData, registry: Option<ComponentRegistry>, hooks: H) -> Result<Self>
    where
        H: ApplicationHooks + 'static,
    {
        Self::build(config, registry.unwrap_or_default(), Box::new(hooks))
    }

    fn build(
        mut config: ConfigData,
        registry: ComponentRegistry,
        hooks: Box<dyn ApplicationHooks>,
    ) -> Result<Self> {
        let name: String = config.get("name").unwrap_or_default();
        if name.trim().is_empty() {
            return Err(BundleSystemError::InvalidIdentity {
                message: "application config has no \"name\"".to_string(),
            }
            .into());
        }
        let identity = BundleIdentity::new(APP_BUNDLE_TYPE, &name)?;
        let dependencies = config.get_string_list("dependencies")?;
        let overrides = config.get_string_list("overrides")?;

        config.set_parent(identity.identifier());

        let app = Self {
            identity,
            dependencies,
            overrides,
            config: RwLock::new(config),
            components: RwLock::new(registry),
            booted: AtomicBool::new(false),
            hooks,
        };
        app.hooks.on_init(&app)?;
        Ok(app)
    }

    /// The application's namespace, if configured
    pub fn namespace(&self) -> Option<String> {
        self.get_config("namespace")
    }

    /// Set a config item. `None` removes it.
    pub fn set_config(&self, item: &str, value: Option<Value>) -> Result<()> {
        let mut config = self.write_config();
        match value {
            Some(value) => config.set(item, value),
            None => {
                config.remove(item);
                Ok(())
            }
        }
    }

    /// Read a config item as `T`
    pub fn get_config<T: DeserializeOwned>(&self, item: &str) -> Option<T> {
        self.read_config().get(item)
    }

    /// Snapshot of the whole configuration
    pub fn config(&self) -> ConfigData {
        self.read_config().clone()
    }

    /// Store a component in the application's object registry
    pub fn set_component<V>(&self, name: &str, component: Arc<V>)
    where
        V: Any + Send + Sync,
    {
        self.write_components().set(name, component);
    }

    /// Retrieve a component from the application's object registry
    pub fn get_component<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.read_components().get::<T>(name)
    }

    fn read_config(&self) -> RwLockReadGuard<'_, ConfigData> {
        self.config.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_config(&self) -> RwLockWriteGuard<'_, ConfigData> {
        self.config.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_components(&self) -> RwLockReadGuard<'_, ComponentRegistry> {
        self.components.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_components(&self) -> RwLockWriteGuard<'_, ComponentRegistry> {
        self.components.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Bundle for Application {
    fn bundle_type(&self) -> &str {
        self.identity.bundle_type()
    }

    fn name(&self) -> &str {
        self.identity.name()
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn overrides(&self) -> Vec<String> {
        self.overrides.clone()
    }

    fn is_booted(&self) -> bool {
        self.booted.load(Ordering::SeqCst)
    }

    fn boot(&self) -> Result<()> {
        if self.booted.swap(true, Ordering::SeqCst) {
            return Err(BundleSystemError::AlreadyBooted {
                identifier: self.identity.identifier(),
            }
            .into());
        }
        info!("Application '{}' booted", self.identity.name());
        self.hooks.on_boot(self)
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("identity", &self.identity)
            .field("dependencies", &self.dependencies)
            .field("overrides", &self.overrides)
            .field("booted", &self.is_booted())
            .finish_non_exhaustive()
    }
}
