use std::borrow::Cow;

use crate::Arguments;

/// A target that can be invoked like a function.
///
/// This is the call half of what a wrapped target exposes. The value it
/// returns is stored behind an `Arc` by the cache layer, so it must be
/// shareable across threads.
///
/// Closures of the shape `Fn(Arguments) -> Result<R, E>` implement this trait
/// out of the box.
///
/// # Examples
///
/// ```
/// use module_context_core::{Arguments, Callable};
/// use std::convert::Infallible;
///
/// struct Greeter;
///
/// impl Callable for Greeter {
///     type Output = String;
///     type Error = Infallible;
///
///     fn call(&self, args: Arguments) -> Result<String, Infallible> {
///         let who = args.first().and_then(|v| v.as_str()).unwrap_or("world");
///         Ok(format!("hello {}", who))
///     }
/// }
///
/// assert_eq!(Greeter.call(Arguments::new()).unwrap(), "hello world");
/// assert_eq!(Greeter.display_name(), "Greeter");
/// ```
pub trait Callable {
    type Output: Send + Sync + 'static;
    type Error;

    fn call(&self, args: Arguments) -> Result<Self::Output, Self::Error>;

    /// Human readable name, used to label debug-only entries.
    fn display_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name::<Self>())
    }
}

/// A target that can be constructed, like a class.
///
/// Construction runs through exactly the same cache logic as [`Callable::call`];
/// the only difference is which entry point of the target is dispatched to.
pub trait Constructible {
    type Instance: Send + Sync + 'static;
    type Error;

    fn construct(&self, args: Arguments) -> Result<Self::Instance, Self::Error>;

    /// Human readable name, used to label debug-only entries.
    fn display_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name::<Self>())
    }
}

impl<F, R, E> Callable for F
where
    F: Fn(Arguments) -> Result<R, E>,
    R: Send + Sync + 'static,
{
    type Output = R;
    type Error = E;

    fn call(&self, args: Arguments) -> Result<R, E> {
        self(args)
    }
}

/// Closure adapter that carries an explicit display name.
///
/// Closures have no readable name of their own; wrap them in `NamedFn` when the
/// name shows up in debug listings.
///
/// # Examples
///
/// ```
/// use module_context_core::{Arguments, Callable, NamedFn};
///
/// let template = NamedFn::new("template", |_args: Arguments| Ok::<_, ()>(vec![1, 2, 3]));
/// assert_eq!(template.display_name(), "template");
/// assert_eq!(template.call(Arguments::new()), Ok(vec![1, 2, 3]));
/// ```
#[derive(Clone)]
pub struct NamedFn<F> {
    name: Cow<'static, str>,
    func: F,
}

impl<F> NamedFn<F> {
    pub fn new(name: impl Into<Cow<'static, str>>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F, R, E> Callable for NamedFn<F>
where
    F: Fn(Arguments) -> Result<R, E>,
    R: Send + Sync + 'static,
{
    type Output = R;
    type Error = E;

    fn call(&self, args: Arguments) -> Result<R, E> {
        (self.func)(args)
    }

    fn display_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

impl<F, R, E> Constructible for NamedFn<F>
where
    F: Fn(Arguments) -> Result<R, E>,
    R: Send + Sync + 'static,
{
    type Instance = R;
    type Error = E;

    fn construct(&self, args: Arguments) -> Result<R, E> {
        (self.func)(args)
    }

    fn display_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// Last path segment of a type name, generics included.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base_end = full.find('<').unwrap_or(full.len());
    match full[..base_end].rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
