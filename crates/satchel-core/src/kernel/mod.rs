//! # Satchel Core Kernel
//!
//! Crate-wide plumbing: the [`Error`](error::Error) type, constants, the named
//! [`ComponentRegistry`](component::ComponentRegistry) used by applications,
//! and the [`Kernel`](bootstrap::Kernel) host that builds a bundle manager
//! from a [`HostConfig`](bootstrap::HostConfig).
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;

pub use bootstrap::{BootOutcome, HostConfig, Kernel};
pub use component::ComponentRegistry;
pub use error::{Error, Result};
