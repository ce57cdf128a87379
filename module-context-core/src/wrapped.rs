use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::{Arguments, Callable, Constructible, Context, InvokeError};

/// A target wrapped so that calling or constructing it goes through the cache
/// of its owning [`Context`].
///
/// - [`call`](WrappedTarget::call) is available when the target is [`Callable`]
/// - [`construct`](WrappedTarget::construct) is available when the target is [`Constructible`]
/// - [`context`](WrappedTarget::context) returns the owning context
/// - every other access goes straight to the target through `Deref`
///
/// Results come back as `Arc`s. Two results are the same cached value exactly
/// when `Arc::ptr_eq` holds for them.
///
/// Clones share the target and the context.
///
/// # Examples
///
/// ```
/// use module_context_core::{Arguments, Registry};
/// use std::sync::Arc;
///
/// let factory = Registry::new().resolve(None);
///
/// let cached = factory.wrap(|_args: Arguments| Ok::<_, ()>(vec![0u8; 4]), Some("buffer"));
/// let a = cached.call(Arguments::new()).unwrap();
/// let b = cached.call(Arguments::new()).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// let fresh = factory.wrap(|_args: Arguments| Ok::<_, ()>(vec![0u8; 4]), None);
/// let c = fresh.call(Arguments::new()).unwrap();
/// let d = fresh.call(Arguments::new()).unwrap();
/// assert!(!Arc::ptr_eq(&c, &d));
/// ```
pub struct WrappedTarget<T> {
    target: Arc<T>,
    context: Arc<Context>,
}

impl<T> WrappedTarget<T> {
    pub(crate) fn new(target: T, context: Arc<Context>) -> Self {
        Self {
            target: Arc::new(target),
            context,
        }
    }

    /// The context that owns this wrapper.
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// The underlying target, bypassing the cache.
    pub fn target(&self) -> &T {
        &self.target
    }
}

impl<T: Callable> WrappedTarget<T> {
    /// Calls the target through the cache.
    pub fn call(&self, args: Arguments) -> Result<Arc<T::Output>, InvokeError<T::Error>> {
        let target = &*self.target;
        self.context
            .invoke(Callable::display_name(target), args, |args| target.call(args))
    }
}

impl<T: Constructible> WrappedTarget<T> {
    /// Constructs the target through the cache.
    pub fn construct(
        &self,
        args: Arguments,
    ) -> Result<Arc<T::Instance>, InvokeError<T::Error>> {
        let target = &*self.target;
        self.context.invoke(
            Constructible::display_name(target),
            args,
            |args| target.construct(args),
        )
    }
}

impl<T> Clone for WrappedTarget<T> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
            context: Arc::clone(&self.context),
        }
    }
}

impl<T> Deref for WrappedTarget<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.target
    }
}

impl<T: fmt::Debug> fmt::Debug for WrappedTarget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedTarget")
            .field("target", &self.target)
            .field("cache_name", &self.context.cache_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContextFactory, Settings};
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Server {
        port: u16,
        built: AtomicUsize,
    }

    struct Instance {
        port: u16,
    }

    impl Constructible for Server {
        type Instance = Instance;
        type Error = Infallible;

        fn construct(&self, _args: Arguments) -> Result<Instance, Infallible> {
            self.built.fetch_add(1, Ordering::SeqCst);
            Ok(Instance { port: self.port })
        }
    }

    #[test]
    fn test_construct_is_cached() {
        let factory = ContextFactory::standalone(Settings::default());
        let wrapped = factory.wrap(Server { port: 80, ..Default::default() }, Some("http"));

        let a = wrapped.construct(Arguments::new()).unwrap();
        let b = wrapped.construct(Arguments::new()).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.port, 80);
        assert_eq!(wrapped.built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_property_reads_delegate() {
        let factory = ContextFactory::standalone(Settings::default());
        let wrapped = factory.wrap(Server { port: 443, ..Default::default() }, None);
        assert_eq!(wrapped.port, 443);
        assert_eq!(wrapped.target().port, 443);
    }

    #[test]
    fn test_context_back_reference() {
        let factory = ContextFactory::standalone(Settings::default());
        let wrapped = factory.wrap(Server::default(), Some("A"));
        let clone = wrapped.clone();

        assert!(Arc::ptr_eq(wrapped.context(), clone.context()));
        assert_eq!(wrapped.context().factory(), &factory);
        assert_eq!(wrapped.context().cache_name().as_deref(), Some("A"));
    }

    #[test]
    fn test_debug_format() {
        let factory = ContextFactory::standalone(Settings::default());
        let wrapped = factory.wrap(Server::default(), Some("A"));
        let rendered = format!("{:?}", wrapped);
        assert!(rendered.contains("WrappedTarget"));
        assert!(rendered.contains("\"A\""));
    }
}
