//! # Satchel Core Storage
//!
//! Configuration storage shared by the bundle kinds and the host:
//! [`ConfigData`], the key/value store an [`Application`](crate::bundle_system::Application)
//! wraps, and [`ConfigFormat`], which reads JSON, YAML and TOML files.
pub mod config;
pub mod error;

pub use config::{ConfigData, ConfigFormat};
pub use error::StorageSystemError;
