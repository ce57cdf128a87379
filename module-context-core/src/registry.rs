use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::{ContextFactory, Settings, WrappedTarget};

/// Registry of named [`ContextFactory`]s.
///
/// A key is resolved to the same factory for as long as the registry lives;
/// factories are created on first request and never removed. Resolving
/// without a key always produces a fresh factory that no other request will
/// ever see.
///
/// The registry is an ordinary value: create one in your composition root and
/// pass it to whatever needs it. [`Registry::global`] offers a lazily created
/// process-wide instance for code that prefers a single shared one.
///
/// # Thread Safety
///
/// The registry can be shared across threads; concurrent requests for the same
/// key agree on one factory.
///
/// # Examples
///
/// ```
/// use module_context_core::Registry;
///
/// let registry = Registry::new();
///
/// let middleware = registry.resolve(Some("middleware"));
/// assert_eq!(middleware, registry.resolve(Some("middleware")));
/// assert_eq!(middleware.cache_reference_name(), Some("middleware"));
///
/// // Anonymous factories are never shared
/// assert_ne!(registry.resolve(None), registry.resolve(None));
/// assert_eq!(registry.keys(), vec!["middleware".to_string()]);
/// ```
#[derive(Clone)]
pub struct Registry {
    shared: Arc<RegistryShared>,
}

/// State reachable from the factories of a registry.
pub(crate) struct RegistryShared {
    factories: DashMap<String, ContextFactory>,
    settings: Settings,
}

impl RegistryShared {
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .factories
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }

    pub(crate) fn entries(&self) -> Vec<(String, ContextFactory)> {
        let mut entries: Vec<(String, ContextFactory)> = self
            .factories
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::from_env);

impl Registry {
    /// Creates an empty registry with default settings (debug off).
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            shared: Arc::new(RegistryShared {
                factories: DashMap::new(),
                settings,
            }),
        }
    }

    /// Creates an empty registry configured from the process environment.
    ///
    /// See [`Settings::from_env`].
    pub fn from_env() -> Self {
        Self::with_settings(Settings::from_env())
    }

    /// The process-wide registry, created from the environment on first use.
    pub fn global() -> &'static Registry {
        &GLOBAL_REGISTRY
    }

    /// Returns the factory registered under `key`, creating it on first request.
    ///
    /// Without a key (or with an empty one) a new, unregistered factory is
    /// returned every time.
    pub fn resolve(&self, key: Option<&str>) -> ContextFactory {
        let Some(key) = key.filter(|key| !key.is_empty()) else {
            return self.new_factory(None);
        };

        if let Some(factory) = self.shared.factories.get(key) {
            return factory.value().clone();
        }

        self.shared
            .factories
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!(cache_reference_name = %key, "registered context factory");
                self.new_factory(Some(key.to_string()))
            })
            .value()
            .clone()
    }

    /// Wraps `target` using a fresh anonymous factory.
    ///
    /// The wrapper's cache is private to it: nothing else can reach the slot it
    /// populates.
    pub fn wrap<T>(&self, target: T, cache_name: Option<&str>) -> WrappedTarget<T> {
        self.resolve(None).wrap(target, cache_name)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.shared.factories.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.shared.keys()
    }

    pub fn len(&self) -> usize {
        self.shared.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.factories.is_empty()
    }

    pub fn settings(&self) -> Settings {
        self.shared.settings
    }

    fn new_factory(&self, cache_reference_name: Option<String>) -> ContextFactory {
        ContextFactory::new(
            cache_reference_name,
            self.shared.settings,
            Arc::downgrade(&self.shared),
        )
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
