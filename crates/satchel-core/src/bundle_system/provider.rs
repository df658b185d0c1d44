use std::fmt;
use std::sync::Arc;

use crate::bundle_system::traits::Bundle;

/// Lazy factory producing a bundle the first time its identifier is requested.
///
/// `bundle_type` is `None` when the requested identifier had no type part.
/// Returning `None` for a key the provider is registered under is a contract
/// violation and fails the lookup with an error.
pub trait BundleProvider: Send + Sync {
    fn provide_bundle(&self, bundle_type: Option<&str>, name: &str) -> Option<Arc<dyn Bundle>>;
}

/// Adapter turning a two-argument closure into a [`BundleProvider`].
pub struct FnProvider<F> {
    func: F,
}

impl<F> FnProvider<F>
where
    F: Fn(Option<&str>, &str) -> Option<Arc<dyn Bundle>> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> BundleProvider for FnProvider<F>
where
    F: Fn(Option<&str>, &str) -> Option<Arc<dyn Bundle>> + Send + Sync,
{
    fn provide_bundle(&self, bundle_type: Option<&str>, name: &str) -> Option<Arc<dyn Bundle>> {
        (self.func)(bundle_type, name)
    }
}

impl<F> fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider").finish_non_exhaustive()
    }
}

/// Wrap a closure as a shareable provider, ready for registration.
pub fn provider_fn<F>(func: F) -> Arc<dyn BundleProvider>
where
    F: Fn(Option<&str>, &str) -> Option<Arc<dyn Bundle>> + Send + Sync + 'static,
{
    Arc::new(FnProvider::new(func))
}
