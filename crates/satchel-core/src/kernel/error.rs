//! # Satchel Core Kernel Errors
//!
//! Defines the crate-wide [`Error`] type and its [`Result`] alias.
//!
//! Each subsystem owns a typed error enum ([`BundleSystemError`] for the
//! bundle manager and bundle kinds, [`StorageSystemError`] for configuration
//! files); `Error` wraps them so `?` works across subsystem boundaries.
use std::result::Result as StdResult;

use crate::bundle_system::error::BundleSystemError;
use crate::storage::error::StorageSystemError;
use thiserror::Error as ThisError;

/// Crate-wide error type
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed bundle system error
    #[error("Bundle system error: {0}")]
    BundleSystem(#[from] BundleSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// The bundle system error wrapped by this error, if any.
    pub fn as_bundle_error(&self) -> Option<&BundleSystemError> {
        match self {
            Error::BundleSystem(inner) => Some(inner),
            _ => None,
        }
    }
}
