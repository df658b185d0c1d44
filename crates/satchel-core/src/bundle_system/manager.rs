use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::bundle_system::dependency::DependencyFailure;
use crate::bundle_system::error::BundleSystemError;
use crate::bundle_system::identifier::{normalize, BundleId};
use crate::bundle_system::provider::BundleProvider;
use crate::bundle_system::traits::Bundle;
use crate::kernel::constants::IDENTIFIER_SEPARATOR;
use crate::kernel::error::{Error, Result};

/// Registry and orchestrator for bundles.
///
/// Holds the realized bundles and the providers able to create bundles on
/// demand. Lookups are case-insensitive. A realized bundle is never
/// re-created by a provider; providers are only consulted on a registry miss.
///
/// The manager is synchronous and has no internal locking. Wrap it in a
/// [`SharedBundleManager`](crate::bundle_system::SharedBundleManager) to share
/// it between tasks.
#[derive(Default)]
pub struct BundleManager {
    /// Realized bundles keyed by lower-cased identifier
    bundles: HashMap<String, Arc<dyn Bundle>>,
    /// Providers keyed by lower-cased bundle name, identifier or type
    providers: HashMap<String, Arc<dyn BundleProvider>>,
    /// Identifiers booted through this manager, in first-boot order
    boot_order: Vec<String>,
}

impl BundleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider for one bundle name (or full identifier).
    pub fn provide(&mut self, name: &str, provider: Arc<dyn BundleProvider>) -> Result<()> {
        let key = validate_name_key(name)?;
        debug!("Registering bundle provider for '{}'", key);
        self.providers.insert(key, provider);
        Ok(())
    }

    /// Register a provider for every bundle of a type.
    pub fn provide_type(&mut self, bundle_type: &str, provider: Arc<dyn BundleProvider>) -> Result<()> {
        let key = validate_name_key(bundle_type)?;
        if key.contains(IDENTIFIER_SEPARATOR) {
            return Err(BundleSystemError::InvalidProvider {
                key,
                reason: format!("a bundle type must not contain '{}'", IDENTIFIER_SEPARATOR),
            }
            .into());
        }
        debug!("Registering bundle provider for type '{}'", key);
        self.providers.insert(key, provider);
        Ok(())
    }

    /// Register one provider under several bundle names.
    ///
    /// All names are validated first; if any is rejected nothing is registered.
    pub fn provide_multiple<S: AsRef<str>>(
        &mut self,
        names: &[S],
        provider: Arc<dyn BundleProvider>,
    ) -> Result<()> {
        if names.is_empty() {
            return Err(BundleSystemError::InvalidProvider {
                key: String::new(),
                reason: "no bundle names given".to_string(),
            }
            .into());
        }
        let keys = names
            .iter()
            .map(|name| validate_name_key(name.as_ref()))
            .collect::<Result<Vec<String>>>()?;

        for key in keys {
            debug!("Registering bundle provider for '{}'", key);
            self.providers.insert(key, provider.clone());
        }
        Ok(())
    }

    /// Insert or replace a realized bundle at its lower-cased identifier.
    pub fn set_bundle(&mut self, bundle: Arc<dyn Bundle>) {
        let key = normalize(&bundle.identifier());
        debug!("Setting bundle '{}'", key);
        self.bundles.insert(key, bundle);
    }

    /// Remove a realized bundle without shutting it down.
    pub fn remove_bundle(&mut self, name: &str) -> Option<Arc<dyn Bundle>> {
        let key = normalize(name);
        self.boot_order.retain(|id| id != &key);
        self.bundles.remove(&key)
    }

    /// Return a bundle by identifier, creating it through a provider if it
    /// has not been realized yet.
    ///
    /// `Ok(None)` means no bundle and no provider is known for `name`. A
    /// provider that fails to deliver a matching bundle is an error.
    pub fn get_bundle(&mut self, name: &str) -> Result<Option<Arc<dyn Bundle>>> {
        let key = normalize(name);
        if let Some(bundle) = self.realized(&key) {
            return Ok(Some(bundle.clone()));
        }
        self.set_bundle_from_provider(&key)
    }

    /// Whether a bundle is realized or could be provided.
    ///
    /// Checks the realized bundles, then a provider registered under the exact
    /// name, then (when any provider is registered) one registered under the
    /// type prefix. Never creates anything.
    pub fn exists(&self, name: &str) -> bool {
        let key = normalize(name);
        if self.bundles.contains_key(&key) || self.providers.contains_key(&key) {
            return true;
        }
        if self.providers.is_empty() {
            return false;
        }
        key.split_once(IDENTIFIER_SEPARATOR)
            .is_some_and(|(bundle_type, _)| self.providers.contains_key(bundle_type))
    }

    /// Whether a bundle is realized at exactly `name` and reports booted.
    /// Never resolves or boots anything.
    pub fn is_booted(&self, name: &str) -> bool {
        self.bundles
            .get(&normalize(name))
            .is_some_and(|bundle| bundle.is_booted())
    }

    /// Boot a bundle and, first, its dependencies.
    ///
    /// Returns `Ok(false)` when the bundle cannot be found, `Ok(true)` once the
    /// boot procedure completed. The target's own `boot()` is called even if
    /// it is already booted; dependencies that report booted are skipped.
    pub fn boot(&mut self, name: &str) -> Result<bool> {
        let Some(bundle) = self.get_bundle(name)? else {
            info!("Bundle '{}' not found, nothing to boot", name);
            return Ok(false);
        };
        let mut booting = Vec::new();
        self.boot_bundle(&bundle, &mut booting)?;
        Ok(true)
    }

    /// Uninstall a realized, installed bundle. Returns false when the bundle
    /// is not realized, not installable or not installed.
    pub fn uninstall(&mut self, name: &str) -> Result<bool> {
        let Some(bundle) = self.bundles.get(&normalize(name)).cloned() else {
            return Ok(false);
        };
        match bundle.as_installable() {
            Some(installable) if installable.is_installed() => {
                info!("Uninstalling bundle '{}'", bundle.identifier());
                installable.uninstall()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Shut down every realized bundle that reports booted, most recently
    /// booted first. Bundles booted outside the manager follow, by identifier.
    ///
    /// Every bundle is attempted; the first error is returned afterwards.
    pub fn shutdown_all(&mut self) -> Result<()> {
        let mut order: Vec<String> = self
            .boot_order
            .iter()
            .rev()
            .filter(|id| self.bundles.contains_key(*id))
            .cloned()
            .collect();
        let mut others: Vec<String> = self
            .bundles
            .keys()
            .filter(|id| !order.contains(*id))
            .cloned()
            .collect();
        others.sort();
        order.extend(others);

        let mut first_error = None;
        for id in order {
            let Some(bundle) = self.bundles.get(&id) else {
                continue;
            };
            if !bundle.is_booted() {
                continue;
            }
            info!("Shutting down bundle '{}'", id);
            if let Err(e) = bundle.shutdown() {
                warn!("Failed to shut down bundle '{}': {}", id, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Identifiers of all realized bundles, sorted
    pub fn bundle_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.bundles.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Keys of all registered providers, sorted
    pub fn provider_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.providers.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Identifiers booted through this manager, in first-boot order
    pub fn boot_order(&self) -> &[String] {
        &self.boot_order
    }

    /// Look up a realized bundle for [`BundleManager::get_bundle`]. An untyped
    /// key also matches a realized bundle of that name (first by identifier
    /// order).
    fn realized(&self, key: &str) -> Option<&Arc<dyn Bundle>> {
        if let Some(bundle) = self.bundles.get(key) {
            return Some(bundle);
        }
        if key.contains(IDENTIFIER_SEPARATOR) {
            return None;
        }
        let mut matches: Vec<(&String, &Arc<dyn Bundle>)> = self
            .bundles
            .iter()
            .filter(|(_, bundle)| normalize(bundle.name()) == key)
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0));
        matches.into_iter().next().map(|(_, bundle)| bundle)
    }

    /// Provider lookup: full key, then local name, then type.
    fn provider_for(&self, id: &BundleId) -> Option<Arc<dyn BundleProvider>> {
        let mut candidates = vec![id.key(), id.name().to_string()];
        if let Some(bundle_type) = id.bundle_type() {
            candidates.push(bundle_type.to_string());
        }
        candidates
            .iter()
            .find_map(|candidate| self.providers.get(candidate).cloned())
    }

    fn set_bundle_from_provider(&mut self, key: &str) -> Result<Option<Arc<dyn Bundle>>> {
        let id = BundleId::parse(key);
        let Some(provider) = self.provider_for(&id) else {
            debug!("No provider registered for bundle '{}'", key);
            return Ok(None);
        };

        debug!("Providing bundle '{}'", key);
        let bundle = provider
            .provide_bundle(id.bundle_type(), id.name())
            .ok_or_else(|| BundleSystemError::ContractViolation {
                identifier: key.to_string(),
                message: "the provider returned no bundle".to_string(),
            })?;

        let matches = match id.bundle_type() {
            Some(_) => normalize(&bundle.identifier()) == key,
            None => normalize(bundle.name()) == id.name(),
        };
        if !matches {
            return Err(BundleSystemError::ContractViolation {
                identifier: key.to_string(),
                message: format!("the provider returned bundle '{}'", bundle.identifier()),
            }
            .into());
        }

        self.set_bundle(bundle.clone());
        Ok(Some(bundle))
    }

    /// Boot `bundle` with cycle tracking. `booting` is the chain of
    /// identifiers currently being booted.
    fn boot_bundle(&mut self, bundle: &Arc<dyn Bundle>, booting: &mut Vec<String>) -> Result<()> {
        let identifier = normalize(&bundle.identifier());
        if let Some(start) = booting.iter().position(|id| id == &identifier) {
            let mut cycle = booting[start..].to_vec();
            cycle.push(identifier);
            return Err(BundleSystemError::CyclicDependency(cycle).into());
        }

        booting.push(identifier.clone());
        let result = self.run_boot_sequence(bundle, &identifier, booting);
        booting.pop();
        result
    }

    fn run_boot_sequence(
        &mut self,
        bundle: &Arc<dyn Bundle>,
        identifier: &str,
        booting: &mut Vec<String>,
    ) -> Result<()> {
        self.boot_dependencies(bundle, booting)?;
        self.shutdown_overrides(bundle, identifier)?;

        if let Some(installable) = bundle.as_installable() {
            if !installable.is_installed() {
                info!("Installing bundle '{}'", identifier);
                installable.install()?;
            }
        }

        info!("Booting bundle '{}'", identifier);
        bundle.boot()?;
        if !self.boot_order.iter().any(|id| id == identifier) {
            self.boot_order.push(identifier.to_string());
        }
        Ok(())
    }

    /// Boot every dependency of `bundle`, collecting all that are missing
    /// before failing.
    fn boot_dependencies(&mut self, bundle: &Arc<dyn Bundle>, booting: &mut Vec<String>) -> Result<()> {
        let dependencies = bundle.dependencies();
        if dependencies.is_empty() {
            return Ok(());
        }

        let mut failure = DependencyFailure::new(bundle.name(), Vec::new());
        for dependency in dependencies {
            let Some(dep) = self.get_bundle(&dependency)? else {
                failure.push(dependency);
                continue;
            };
            if dep.is_booted() {
                continue;
            }
            match self.boot_bundle(&dep, booting) {
                Ok(()) => {}
                Err(Error::BundleSystem(BundleSystemError::Dependency(nested))) => {
                    failure.extend(nested.missing);
                }
                Err(e) => return Err(e),
            }
        }

        if failure.is_empty() {
            return Ok(());
        }
        warn!("{}", failure);
        Err(BundleSystemError::Dependency(failure).into())
    }

    /// Shut down and evict every realized bundle `bundle` overrides.
    fn shutdown_overrides(&mut self, bundle: &Arc<dyn Bundle>, identifier: &str) -> Result<()> {
        for name in bundle.overrides() {
            let key = normalize(&name);
            if key == identifier {
                debug!("Bundle '{}' lists itself as an override, ignoring", identifier);
                continue;
            }
            let Some(overridden) = self.bundles.get(&key).cloned() else {
                continue;
            };
            info!("Bundle '{}' overrides '{}', shutting it down", identifier, key);
            overridden.shutdown()?;
            self.bundles.remove(&key);
            self.boot_order.retain(|id| id != &key);
        }
        Ok(())
    }
}

impl fmt::Debug for BundleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleManager")
            .field("bundles", &self.bundle_ids())
            .field("providers", &self.provider_keys())
            .field("boot_order", &self.boot_order)
            .finish()
    }
}

fn validate_name_key(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(BundleSystemError::InvalidProvider {
            key: name.to_string(),
            reason: "the key must not be empty".to_string(),
        }
        .into());
    }
    Ok(normalize(name))
}
