//! Bundle lifecycle management.
//!
//! A [`BundleManager`] keeps a registry of realized [`Bundle`]s and of
//! [`BundleProvider`]s that create bundles on first use. Booting a bundle boots
//! its dependencies first, shuts down and evicts the bundles it overrides, and
//! installs it if needed.
pub mod bundle_system;
pub mod kernel;
pub mod storage;

pub use bundle_system::{
    provider_fn, Application, Bundle, BundleManager, BundleProvider, BundleSystemError,
    DependencyFailure, Installable, Library, LibraryProvider, SharedBundleManager,
};
pub use kernel::error::{Error, Result};
pub use kernel::{HostConfig, Kernel};
pub use storage::ConfigData;

#[cfg(test)]
mod tests;
