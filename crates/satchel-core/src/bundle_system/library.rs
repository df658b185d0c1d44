use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::bundle_system::error::BundleSystemError;
use crate::bundle_system::manager::BundleManager;
use crate::bundle_system::provider::BundleProvider;
use crate::bundle_system::traits::{Bundle, BundleIdentity};
use crate::kernel::constants::{LIBRARY_BOOTSTRAP_STEM, LIBRARY_BUNDLE_TYPE, LIBRARY_MANIFEST_STEM};
use crate::kernel::error::Result;
use crate::storage::config::{ConfigData, ConfigFormat};
use crate::storage::error::StorageSystemError;

/// Optional `bundle.<ext>` file at the root of a library directory
#[derive(Debug, Default, Deserialize)]
struct LibraryManifest {
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    overrides: Vec<String>,
}

/// A bundle of type `"library"` backed by a directory.
///
/// The name is the lower-cased directory name. Booting loads the directory's
/// `bootstrap.<ext>` file, when there is one, into [`Library::settings`].
/// Booting again is a no-op.
pub struct Library {
    identity: BundleIdentity,
    path: PathBuf,
    dependencies: Vec<String>,
    overrides: Vec<String>,
    booted: AtomicBool,
    settings: Mutex<ConfigData>,
}

impl Library {
    /// Open the library at `dir`, reading its manifest if present.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let path = fs::canonicalize(dir)
            .map_err(|e| StorageSystemError::io(e, "open_library", dir.to_path_buf()))?;
        if !path.is_dir() {
            return Err(BundleSystemError::InvalidIdentity {
                message: format!("library path '{}' is not a directory", path.display()),
            }
            .into());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let identity = BundleIdentity::new(LIBRARY_BUNDLE_TYPE, &name)?;

        let manifest = match ConfigFormat::find_file(&path, LIBRARY_MANIFEST_STEM) {
            Some(manifest_path) => {
                debug!("Reading library manifest {}", manifest_path.display());
                ConfigFormat::load_file::<LibraryManifest>(&manifest_path)?
            }
            None => LibraryManifest::default(),
        };

        Ok(Self {
            identity,
            path,
            dependencies: manifest.dependencies,
            overrides: manifest.overrides,
            booted: AtomicBool::new(false),
            settings: Mutex::new(ConfigData::new()),
        })
    }

    /// Canonical path of the library directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings loaded from the bootstrap file; empty before boot or when the
    /// library has none.
    pub fn settings(&self) -> ConfigData {
        self.settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Bundle for Library {
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
        let mut settings = self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.is_booted() {
            return Ok(());
        }

        if let Some(bootstrap) = ConfigFormat::find_file(&self.path, LIBRARY_BOOTSTRAP_STEM) {
            info!("Loading bootstrap {} for library '{}'", bootstrap.display(), self.name());
            let mut loaded = ConfigData::load(&bootstrap)?;
            loaded.set_parent(self.identity.identifier());
            *settings = loaded;
        }

        self.booted.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("identity", &self.identity)
            .field("path", &self.path)
            .field("booted", &self.is_booted())
            .finish_non_exhaustive()
    }
}

/// Provides [`Library`] bundles from the sub-directories of one or more
/// root directories. Earlier roots shadow later ones.
#[derive(Debug, Clone)]
pub struct LibraryProvider {
    roots: Vec<PathBuf>,
}

impl LibraryProvider {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Identifiers (`library.<name>`) of every library under the roots, sorted.
    pub fn discover(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for root in &self.roots {
            let entries = fs::read_dir(root)
                .map_err(|e| StorageSystemError::io(e, "scan_libraries", root.clone()))?;
            for entry in entries {
                let entry = entry.map_err(|e| StorageSystemError::io(e, "scan_libraries", root.clone()))?;
                if !entry.path().is_dir() {
                    continue;
                }
                let id = format!(
                    "{}.{}",
                    LIBRARY_BUNDLE_TYPE,
                    entry.file_name().to_string_lossy().to_lowercase()
                );
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Directory of the library called `name` (case-insensitive), searching
    /// the roots in order.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let wanted = name.to_lowercase();
        self.roots.iter().find_map(|root| {
            fs::read_dir(root).ok()?.flatten().find_map(|entry| {
                let path = entry.path();
                let matches = entry.file_name().to_string_lossy().to_lowercase() == wanted;
                (matches && path.is_dir()).then_some(path)
            })
        })
    }

    /// Register this provider under the identifier of every discovered
    /// library. Returns the identifiers registered.
    pub fn register(self, manager: &mut BundleManager) -> Result<Vec<String>> {
        let ids = self.discover()?;
        if ids.is_empty() {
            debug!("No libraries found under {:?}", self.roots);
            return Ok(ids);
        }
        manager.provide_multiple(&ids, Arc::new(self))?;
        Ok(ids)
    }
}

impl BundleProvider for LibraryProvider {
    fn provide_bundle(&self, bundle_type: Option<&str>, name: &str) -> Option<Arc<dyn Bundle>> {
        if bundle_type.is_some_and(|t| t != LIBRARY_BUNDLE_TYPE) {
            return None;
        }
        let dir = self.locate(name)?;
        match Library::open(&dir) {
            Ok(library) => Some(Arc::new(library)),
            Err(e) => {
                warn!("Could not open library '{}' at {}: {}", name, dir.display(), e);
                None
            }
        }
    }
}
