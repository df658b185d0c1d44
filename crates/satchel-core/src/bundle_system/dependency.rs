use thiserror::Error;

use crate::bundle_system::identifier::normalize;

/// Aggregated failure to boot a bundle's dependencies.
///
/// `missing` holds every identifier that could not be resolved or booted,
/// flattened across the whole dependency tree, without case-insensitive
/// duplicates and in the order the failures were first seen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not boot bundle \"{}\" - failed to load dependencies: \"{}\"", .bundle, .missing.join(", "))]
pub struct DependencyFailure {
    /// Name of the bundle whose boot was abandoned
    pub bundle: String,
    /// Identifiers that could not be resolved or booted
    pub missing: Vec<String>,
}

impl DependencyFailure {
    pub fn new(bundle: impl Into<String>, missing: Vec<String>) -> Self {
        let mut failure = Self {
            bundle: bundle.into(),
            missing: Vec::with_capacity(missing.len()),
        };
        failure.extend(missing);
        failure
    }

    /// Record one missing identifier unless it is already listed. Identifiers
    /// compare case-insensitively; the first spelling seen is kept.
    pub fn push(&mut self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        let key = normalize(&identifier);
        if !self.missing.iter().any(|seen| normalize(seen) == key) {
            self.missing.push(identifier);
        }
    }

    /// Merge a list of missing identifiers reported further down the tree.
    pub fn extend<I>(&mut self, identifiers: I)
    where
        I: IntoIterator<Item = String>,
    {
        for identifier in identifiers {
            self.push(identifier);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}
