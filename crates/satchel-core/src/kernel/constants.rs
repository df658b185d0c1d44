/// Application name
pub const APP_NAME: &str = "satchel";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Separator between a bundle's type and name in its identifier
pub const IDENTIFIER_SEPARATOR: char = '.';

/// Bundle type of [`Application`](crate::bundle_system::Application) bundles
pub const APP_BUNDLE_TYPE: &str = "app";

/// Bundle type of [`Library`](crate::bundle_system::Library) bundles
pub const LIBRARY_BUNDLE_TYPE: &str = "library";

/// File stem of a library's manifest (dependencies, overrides)
pub const LIBRARY_MANIFEST_STEM: &str = "bundle";

/// File stem of a library's bootstrap settings, loaded on first boot
pub const LIBRARY_BOOTSTRAP_STEM: &str = "bootstrap";
