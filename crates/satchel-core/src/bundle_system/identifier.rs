use std::fmt;

use crate::kernel::constants::IDENTIFIER_SEPARATOR;

/// A bundle address of the form `"<type>.<name>"`.
///
/// Identifiers are case-insensitive: both parts are stored lower-cased, so
/// [`BundleId::key`] is the exact string used by the manager's registries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleId {
    /// Bundle type; `None` when the identifier has no separator
    pub bundle_type: Option<String>,
    /// Local bundle name
    pub name: String,
}

impl BundleId {
    /// Create an identifier from its parts
    pub fn new(bundle_type: &str, name: &str) -> Self {
        Self {
            bundle_type: Some(bundle_type.to_lowercase()),
            name: name.to_lowercase(),
        }
    }

    /// Parse `"<type>.<name>"`, splitting on the first separator only.
    /// Without a separator the whole string is the name.
    pub fn parse(identifier: &str) -> Self {
        let lowered = identifier.to_lowercase();
        match lowered.split_once(IDENTIFIER_SEPARATOR) {
            Some((bundle_type, name)) => Self {
                bundle_type: Some(bundle_type.to_string()),
                name: name.to_string(),
            },
            None => Self {
                bundle_type: None,
                name: lowered,
            },
        }
    }

    /// Lower-cased registry key
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn bundle_type(&self) -> Option<&str> {
        self.bundle_type.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bundle_type {
            Some(bundle_type) => write!(f, "{}{}{}", bundle_type, IDENTIFIER_SEPARATOR, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Lower-case a lookup string the way the registries key their entries.
pub fn normalize(identifier: &str) -> String {
    identifier.to_lowercase()
}

/// Derive a default bundle name from the name of its concrete kind.
///
/// Takes the last path segment of `kind_name`, lower-cases it, then strips
/// every occurrence of `"bundle"` followed by every occurrence of the bundle
/// type. `("ShopAppBundle", "app")` gives `"shop"`.
pub fn derive_name(kind_name: &str, bundle_type: &str) -> String {
    let simple = kind_name.rsplit("::").next().unwrap_or(kind_name);
    let mut name = simple.to_lowercase().replace("bundle", "");
    let bundle_type = bundle_type.to_lowercase();
    if !bundle_type.is_empty() {
        name = name.replace(&bundle_type, "");
    }
    name
}
