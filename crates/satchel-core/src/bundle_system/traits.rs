use std::fmt;

use crate::bundle_system::error::BundleSystemError;
use crate::bundle_system::identifier::derive_name;
use crate::kernel::constants::IDENTIFIER_SEPARATOR;
use crate::kernel::error::Result;

/// Core trait that all bundles must implement.
///
/// Bundles are shared as `Arc<dyn Bundle>` between the manager and its
/// callers, so every lifecycle method takes `&self`; concrete kinds keep their
/// mutable state behind atomics or locks.
///
/// `booted` is monotonic: once [`Bundle::is_booted`] reports true it stays
/// true, even after [`Bundle::shutdown`].
pub trait Bundle: Send + Sync {
    /// The bundle type, fixed per concrete kind (e.g. `"app"`)
    fn bundle_type(&self) -> &str;

    /// The bundle name, fixed for the lifetime of the instance
    fn name(&self) -> &str;

    /// `"<type>.<name>"`
    fn identifier(&self) -> String {
        format!("{}{}{}", self.bundle_type(), IDENTIFIER_SEPARATOR, self.name())
    }

    /// Identifiers of bundles that must be booted before this one
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Identifiers of bundles this one replaces when it boots
    fn overrides(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether the bundle has been booted
    fn is_booted(&self) -> bool;

    /// Boot the bundle. Whether a second call is accepted is up to the kind.
    fn boot(&self) -> Result<()>;

    /// Shut the bundle down
    fn shutdown(&self) -> Result<()>;

    /// The install capability of this bundle, if it has one.
    fn as_installable(&self) -> Option<&dyn Installable> {
        None
    }
}

impl fmt::Debug for dyn Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("identifier", &self.identifier())
            .field("booted", &self.is_booted())
            .finish()
    }
}

/// One-time setup capability. The manager installs a bundle before its first
/// boot when [`Installable::is_installed`] reports false.
pub trait Installable {
    fn is_installed(&self) -> bool;

    fn install(&self) -> Result<()>;

    fn uninstall(&self) -> Result<()>;
}

/// Immutable type and name of a bundle, computed once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleIdentity {
    bundle_type: String,
    name: String,
}

impl BundleIdentity {
    /// Identity with an explicitly assigned name
    pub fn new(bundle_type: &str, name: &str) -> Result<Self> {
        if bundle_type.trim().is_empty() {
            return Err(invalid("bundle type must not be empty"));
        }
        if bundle_type.contains(IDENTIFIER_SEPARATOR) {
            return Err(invalid(format!(
                "bundle type '{}' must not contain '{}'",
                bundle_type, IDENTIFIER_SEPARATOR
            )));
        }
        if name.trim().is_empty() {
            return Err(invalid(format!("bundle of type '{}' has an empty name", bundle_type)));
        }
        Ok(Self {
            bundle_type: bundle_type.to_string(),
            name: name.to_string(),
        })
    }

    /// Identity whose name is derived from the concrete kind's name, see
    /// [`derive_name`].
    pub fn derived(bundle_type: &str, kind_name: &str) -> Result<Self> {
        let name = derive_name(kind_name, bundle_type);
        Self::new(bundle_type, &name)
    }

    pub fn bundle_type(&self) -> &str {
        &self.bundle_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> String {
        format!("{}{}{}", self.bundle_type, IDENTIFIER_SEPARATOR, self.name)
    }
}

fn invalid(message: impl Into<String>) -> crate::kernel::error::Error {
    BundleSystemError::InvalidIdentity {
        message: message.into(),
    }
    .into()
}
