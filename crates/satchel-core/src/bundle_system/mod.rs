//! # Satchel Core Bundle System
//!
//! Bundles are named, typed units with a boot/shutdown lifecycle. This module
//! holds the contracts they implement and the manager that realizes, orders
//! and retires them.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: the [`Bundle`] contract, the optional [`Installable`]
//!   capability and [`BundleIdentity`].
//! - **[`identifier`]**: parsing and rendering of `"<type>.<name>"`
//!   identifiers ([`BundleId`]) and default name derivation.
//! - **[`provider`]**: the [`BundleProvider`] factory contract and the
//!   closure adapter [`FnProvider`].
//! - **[`manager`]**: [`BundleManager`], which resolves bundles lazily through
//!   providers, boots dependencies first (aggregating every missing one into a
//!   single [`DependencyFailure`]), retires overridden bundles and installs
//!   bundles before their first boot.
//! - **[`shared`]**: [`SharedBundleManager`], the manager behind one async mutex.
//! - **[`application`]** and **[`library`]**: the bundle kinds shipped with the
//!   crate.
//! - **[`error`]**: [`BundleSystemError`].
pub mod application;
pub mod dependency;
pub mod error;
pub mod identifier;
pub mod library;
pub mod manager;
pub mod provider;
pub mod shared;
pub mod traits;

pub use application::{Application, ApplicationHooks};
pub use dependency::DependencyFailure;
pub use error::BundleSystemError;
pub use identifier::{derive_name, BundleId};
pub use library::{Library, LibraryProvider};
pub use manager::BundleManager;
pub use provider::{provider_fn, BundleProvider, FnProvider};
pub use shared::SharedBundleManager;
pub use traits::{Bundle, BundleIdentity, Installable};

// Test module declaration
#[cfg(test)]
mod tests;
