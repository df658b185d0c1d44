//! # Satchel Core Bundle System Errors
//!
//! Defines [`BundleSystemError`], covering provider registration, lazy
//! resolution, dependency booting and the lifecycle failures of the bundle
//! kinds shipped with the crate.
use crate::bundle_system::dependency::DependencyFailure;

#[derive(Debug, thiserror::Error)]
pub enum BundleSystemError {
    /// A provider could not be registered under the given key.
    #[error("Invalid provider registration for '{key}': {reason}")]
    InvalidProvider { key: String, reason: String },

    /// A provider produced no bundle, or a bundle with the wrong identity.
    #[error("A valid bundle was not provided for '{identifier}': {message}")]
    ContractViolation { identifier: String, message: String },

    /// One or more dependencies could not be resolved or booted.
    #[error(transparent)]
    Dependency(#[from] DependencyFailure),

    /// A bundle (transitively) depends on itself.
    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    /// The bundle kind rejects a second boot.
    #[error("Bundle '{identifier}' has already been booted")]
    AlreadyBooted { identifier: String },

    /// A bundle could not establish its type or name.
    #[error("Invalid bundle identity: {message}")]
    InvalidIdentity { message: String },

    #[error("Boot failed for bundle '{identifier}': {message}")]
    BootFailed { identifier: String, message: String },

    #[error("Shutdown failed for bundle '{identifier}': {message}")]
    ShutdownFailed { identifier: String, message: String },

    #[error("Install failed for bundle '{identifier}': {message}")]
    InstallFailed { identifier: String, message: String },
}
