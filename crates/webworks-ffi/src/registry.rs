//! Class name to extension factory registry

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use webworks_core::{Extension, ExtensionError, ExtensionResult};

/// Builds a fresh extension object
pub type ExtensionFactory = Arc<dyn Fn() -> Box<dyn Extension> + Send + Sync>;

static REGISTRY: OnceCell<ExtensionRegistry> = OnceCell::new();

/// Classes this library can instantiate
pub struct ExtensionRegistry {
    factories: RwLock<BTreeMap<String, ExtensionFactory>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(BTreeMap::new()),
        }
    }

    /// Get the global registry
    pub fn global() -> &'static ExtensionRegistry {
        REGISTRY.get_or_init(ExtensionRegistry::new)
    }

    /// Register (or replace) the factory for a class name
    pub fn register<F>(&self, class_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Extension> + Send + Sync + 'static,
    {
        let class_name = class_name.into();
        tracing::debug!(class = %class_name, "registering extension class");
        self.factories.write().insert(class_name, Arc::new(factory));
    }

    /// Instantiate a registered class
    pub fn create(&self, class_name: &str) -> ExtensionResult<Box<dyn Extension>> {
        let factory = self
            .factories
            .read()
            .get(class_name)
            .cloned()
            .ok_or_else(|| ExtensionError::UnknownClass(class_name.to_string()))?;
        Ok(factory())
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.read().contains_key(class_name)
    }

    /// Registered class names, sorted
    pub fn class_names(&self) -> Vec<String> {
        self.factories.read().keys().cloned().collect()
    }

    /// Class names in the host's object-list format
    pub fn object_list(&self) -> String {
        self.class_names().join(" ")
    }

    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
