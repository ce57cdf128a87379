use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::factory::Slot;
use crate::{Arguments, ContextFactory, InvokeError};

thread_local! {
    /// Slots this thread is currently populating, keyed by factory and cache name.
    static POPULATING: RefCell<HashSet<(usize, String)>> = RefCell::new(HashSet::new());
}

/// Marks a slot as being populated by the current thread until dropped.
struct PopulationGuard {
    key: (usize, String),
}

impl PopulationGuard {
    /// Returns `None` if this thread is already populating the slot.
    fn enter(factory: &ContextFactory, cache_name: &str) -> Option<Self> {
        let key = (factory.id(), cache_name.to_string());
        let inserted = POPULATING.with(|p| p.borrow_mut().insert(key.clone()));
        inserted.then_some(Self { key })
    }
}

impl Drop for PopulationGuard {
    fn drop(&mut self) {
        POPULATING.with(|p| {
            p.borrow_mut().remove(&self.key);
        });
    }
}

/// The per-wrap state behind a [`WrappedTarget`](crate::WrappedTarget).
///
/// A context holds the cache name used for lookups and the factory whose store
/// it reads and writes. The cache name is read at every call, so reassigning it
/// redirects the next call to another slot without touching slots that were
/// populated under the previous name.
///
/// # Examples
///
/// ```
/// use module_context_core::{Arguments, Registry};
///
/// let factory = Registry::new().resolve(None);
/// let wrapped = factory.wrap(|_args: Arguments| Ok::<_, ()>(1), None);
///
/// wrapped.context().set_cache_name("X");
/// wrapped.call(Arguments::new()).unwrap();
///
/// assert!(factory.is_cached("X"));
/// ```
#[derive(Debug)]
pub struct Context {
    cache_name: RwLock<Option<String>>,
    factory: ContextFactory,
}

impl Context {
    pub(crate) fn new(factory: ContextFactory, cache_name: Option<String>) -> Self {
        Self {
            cache_name: RwLock::new(cache_name),
            factory,
        }
    }

    pub fn cache_name(&self) -> Option<String> {
        self.cache_name.read().clone()
    }

    /// Sets the cache name consulted by subsequent calls.
    pub fn set_cache_name(&self, cache_name: impl Into<String>) {
        *self.cache_name.write() = Some(cache_name.into());
    }

    /// Removes the cache name; subsequent calls are not cached.
    pub fn clear_cache_name(&self) {
        *self.cache_name.write() = None;
    }

    /// The factory this context belongs to.
    pub fn factory(&self) -> &ContextFactory {
        &self.factory
    }

    /// Runs one call or construction through the cache.
    ///
    /// `dispatch` invokes the underlying target through whichever entry point
    /// the caller used.
    pub(crate) fn invoke<V, E, D>(
        &self,
        display_name: Cow<'_, str>,
        args: Arguments,
        dispatch: D,
    ) -> Result<Arc<V>, InvokeError<E>>
    where
        V: Send + Sync + 'static,
        D: FnOnce(Arguments) -> Result<V, E>,
    {
        // An empty name counts as no name
        let cache_name = self.cache_name().filter(|name| !name.is_empty());

        let Some(cache_name) = cache_name else {
            let value = Arc::new(dispatch(args).map_err(InvokeError::Target)?);
            self.record_non_referenced(&display_name, &value);
            return Ok(value);
        };

        let cell = self.factory.slot(&cache_name);
        let mut populated = false;
        let slot = match cell.get() {
            Some(slot) => slot,
            None => {
                // A target reaching its own slot while computing it would wait forever
                let Some(_guard) = PopulationGuard::enter(&self.factory, &cache_name) else {
                    return Err(InvokeError::Reentrant { cache_name });
                };
                cell.get_or_try_init(|| {
                    let value = dispatch(args.inject_instance_name(&cache_name))
                        .map_err(InvokeError::Target)?;
                    populated = true;
                    let slot: Slot = Arc::new(value);
                    Ok::<_, InvokeError<E>>(slot)
                })?
            }
        };

        let value = slot
            .clone()
            .downcast::<V>()
            .map_err(|_| InvokeError::SlotType {
                cache_name: cache_name.clone(),
                expected: std::any::type_name::<V>(),
            })?;

        if populated {
            self.factory.counter().record_cached();
            debug!(
                cache_reference_name = ?self.factory.cache_reference_name(),
                cache_name = %cache_name,
                target = %display_name,
                "populated cache slot"
            );
        } else {
            self.factory.counter().record_hit();
            trace!(cache_name = %cache_name, "cache slot hit");
        }

        Ok(value)
    }

    /// In debug mode, keeps an uncached result under a synthetic name so it can
    /// be inspected. Such entries never answer a lookup.
    fn record_non_referenced<V: Send + Sync + 'static>(&self, display_name: &str, value: &Arc<V>) {
        let Some(count) = self.factory.counter().record_non_referenced() else {
            return;
        };
        let name = format!("{} {}", display_name, count);
        trace!(entry = %name, "recorded non-referenced target");
        let slot: Slot = value.clone();
        self.factory.record_debug_entry(name, slot);
    }
}
