use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Named object registry.
///
/// Stores arbitrary shared components as `Arc<dyn Any + Send + Sync>` keyed by
/// name, and hands them back downcast to their concrete type.
#[derive(Default)]
pub struct ComponentRegistry {
    instances: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ComponentRegistry {
    /// Create a new empty component registry
    pub fn new() -> Self {
        Self {
            instances: HashMap::new(),
        }
    }

    /// Register a component under `name`, replacing any previous one.
    pub fn set<V>(&mut self, name: &str, instance: Arc<V>)
    where
        V: Any + Send + Sync,
    {
        self.instances.insert(name.to_string(), instance);
    }

    /// Get a component by name as its concrete type T.
    /// Returns None when nothing is registered under `name` or the downcast fails.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.instances
            .get(name)
            .and_then(|instance| Arc::downcast::<T>(instance.clone()).ok())
    }

    /// Get a component by name without downcasting.
    pub fn get_any(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.instances.get(name).cloned()
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.instances.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    /// Names of all registered components, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.instances.keys().cloned().collect();
        names.sort();
        names
    }

    /// Clear all instances.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("names", &self.names())
            .finish()
    }
}
