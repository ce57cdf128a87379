use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::context::Context;
use crate::registry::RegistryShared;
use crate::{CounterSnapshot, Settings, TargetCounter, WrappedTarget};

/// A value stored in a cache slot.
pub(crate) type Slot = Arc<dyn Any + Send + Sync>;

/// Producer of [`Context`]s that share one cache store and one set of counters.
///
/// Every target wrapped through the same factory reads and populates the same
/// store, keyed by the cache name given at wrap time. Slots are write-once:
/// the first successful result stored under a name is returned for every later
/// call under that name, and nothing in this crate ever replaces or removes it.
///
/// Population of a slot is serialized per name, so at most one call computes
/// the value for a given name even when wrappers are shared across threads.
/// A target that fails leaves its slot empty, and the next call tries again.
///
/// `ContextFactory` is a cheap handle; clones refer to the same store and
/// compare equal.
///
/// # Examples
///
/// ```
/// use module_context_core::{Arguments, Registry};
/// use std::sync::Arc;
///
/// let registry = Registry::new();
/// let factory = registry.resolve(Some("middleware"));
///
/// let logger = factory.wrap(|_args: Arguments| Ok::<_, ()>(String::from("logger")), Some("log"));
/// let first = logger.call(Arguments::new()).unwrap();
/// let second = logger.call(Arguments::new()).unwrap();
///
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(factory.cached_names(), vec!["log".to_string()]);
/// assert_eq!(factory.cache_reference_name(), Some("middleware"));
/// ```
#[derive(Clone)]
pub struct ContextFactory {
    inner: Arc<FactoryInner>,
}

struct FactoryInner {
    cache_reference_name: Option<String>,
    slots: DashMap<String, Arc<OnceCell<Slot>>>,
    debug_slots: RwLock<Vec<(String, Slot)>>,
    counter: TargetCounter,
    registry: Weak<RegistryShared>,
}

impl ContextFactory {
    pub(crate) fn new(
        cache_reference_name: Option<String>,
        settings: Settings,
        registry: Weak<RegistryShared>,
    ) -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                cache_reference_name,
                slots: DashMap::new(),
                debug_slots: RwLock::new(Vec::new()),
                counter: TargetCounter::new(settings.debug),
                registry,
            }),
        }
    }

    /// Creates a factory that belongs to no registry.
    pub fn standalone(settings: Settings) -> Self {
        Self::new(None, settings, Weak::new())
    }

    /// Wraps `target` in a new [`Context`] bound to this factory.
    ///
    /// With a `cache_name`, the first successful call stores its result under
    /// that name and every later call (from any wrapper of this factory using
    /// the same name) returns the stored value. Without one, every call invokes
    /// the target.
    pub fn wrap<T>(&self, target: T, cache_name: Option<&str>) -> WrappedTarget<T> {
        let context = Context::new(self.clone(), cache_name.map(str::to_string));
        WrappedTarget::new(target, Arc::new(context))
    }

    /// The registry key this factory was created under, if any.
    pub fn cache_reference_name(&self) -> Option<&str> {
        self.inner.cache_reference_name.as_deref()
    }

    /// Keys of every named factory in the registry this factory came from.
    ///
    /// Meant for debugging. Empty for standalone factories and for factories
    /// whose registry has been dropped.
    pub fn registry_keys(&self) -> Vec<String> {
        self.inner
            .registry
            .upgrade()
            .map(|registry| registry.keys())
            .unwrap_or_default()
    }

    /// Every named factory in the registry this factory came from, sorted by key.
    ///
    /// Meant for debugging. Empty under the same conditions as
    /// [`registry_keys`](ContextFactory::registry_keys).
    pub fn registry_entries(&self) -> Vec<(String, ContextFactory)> {
        self.inner
            .registry
            .upgrade()
            .map(|registry| registry.entries())
            .unwrap_or_default()
    }

    /// Returns `true` if a value is stored under `cache_name`.
    pub fn is_cached(&self, cache_name: &str) -> bool {
        self.inner
            .slots
            .get(cache_name)
            .map_or(false, |cell| cell.get().is_some())
    }

    /// Returns the value stored under `cache_name` if it has type `V`.
    pub fn get<V: Send + Sync + 'static>(&self, cache_name: &str) -> Option<Arc<V>> {
        let slot = self.inner.slots.get(cache_name)?.get()?.clone();
        slot.downcast::<V>().ok()
    }

    /// Names of all populated slots.
    pub fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .slots
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Number of populated slots. Debug-only entries are not counted.
    pub fn len(&self) -> usize {
        self.inner
            .slots
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Synthetic names of the uncached results recorded in debug mode, in
    /// recording order.
    pub fn debug_entries(&self) -> Vec<String> {
        self.inner
            .debug_slots
            .read()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Returns a debug-only entry by its synthetic name if it has type `V`.
    pub fn debug_get<V: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<V>> {
        let slots = self.inner.debug_slots.read();
        let (_, slot) = slots.iter().find(|(entry_name, _)| entry_name == name)?;
        slot.clone().downcast::<V>().ok()
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.inner.counter.snapshot()
    }

    pub fn is_debug(&self) -> bool {
        self.inner.counter.is_debug()
    }

    /// Returns `true` if both handles refer to the same factory.
    pub fn ptr_eq(&self, other: &ContextFactory) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address of the shared state, stable for the factory's lifetime.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    pub(crate) fn counter(&self) -> &TargetCounter {
        &self.inner.counter
    }

    /// Returns the write-once cell for `cache_name`, creating an empty one on
    /// first use. The map lock is released before the cell is returned.
    pub(crate) fn slot(&self, cache_name: &str) -> Arc<OnceCell<Slot>> {
        if let Some(cell) = self.inner.slots.get(cache_name) {
            return cell.value().clone();
        }
        self.inner
            .slots
            .entry(cache_name.to_string())
            .or_default()
            .value()
            .clone()
    }

    pub(crate) fn record_debug_entry(&self, name: String, value: Slot) {
        self.inner.debug_slots.write().push((name, value));
    }
}

impl PartialEq for ContextFactory {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ContextFactory {}

impl fmt::Debug for ContextFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextFactory")
            .field("cache_reference_name", &self.inner.cache_reference_name)
            .field("cached_names", &self.cached_names())
            .field("counters", &self.counters())
            .finish()
    }
}
