//! # Module Context
//!
//! Caches modules on demand under a unique key name, so that repeated calls
//! under the same name return the very same value instead of recomputing it.
//!
//! Two ways of using it:
//!
//! - **With a key**: once during application start-up, where references are
//!   kept (a hard link) under a string key such as `"condition"` or
//!   `"middleware"`.
//! - **Anonymous**: many times at runtime, where each result is an ordinary
//!   value dropped when its last reference goes away, e.g. a template.
//!
//! ## Quick Start
//!
//! Resolve a named factory and wrap a target under a cache name:
//!
//! ```rust
//! use module_context::{resolve, Arguments};
//! use std::sync::Arc;
//!
//! let factory = resolve(Some("middleware"));
//! let auth = factory.wrap(|_args: Arguments| Ok::<_, ()>(String::from("auth")), Some("auth"));
//!
//! // First call runs the target, the second returns the stored value
//! let first = auth.call(Arguments::new()).unwrap();
//! let second = auth.call(Arguments::new()).unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//!
//! // The same key always yields the same factory
//! assert_eq!(factory, resolve(Some("middleware")));
//! ```
//!
//! ## Anonymous Use
//!
//! Without a cache name every call produces a new value:
//!
//! ```rust
//! use module_context::{wrap, Arguments};
//! use std::sync::Arc;
//!
//! let template = wrap(|_args: Arguments| Ok::<_, ()>(vec!["<html>"]), None);
//! let a = template.call(Arguments::new()).unwrap();
//! let b = template.call(Arguments::new()).unwrap();
//! assert!(!Arc::ptr_eq(&a, &b));
//! ```
//!
//! ## Instance Names
//!
//! When a call populates a slot and its first argument is an options object,
//! the target receives a copy of it carrying `methodInstanceName`:
//!
//! ```rust
//! use module_context::{json, wrap, Arguments};
//!
//! let handler = wrap(
//!     |args: Arguments| Ok::<_, ()>(args.method_instance_name().map(str::to_string)),
//!     Some("users"),
//! );
//! let seen = handler.call(Arguments::from(json!({ "route": "/users" }))).unwrap();
//! assert_eq!(seen.as_deref(), Some("users"));
//! ```
//!
//! ## Dependency Injection
//!
//! The functions in this crate use [`Registry::global`]. Applications that want
//! isolated state (tests in particular) create their own [`Registry`] and pass
//! it around instead.

pub use module_context_core::*;

/// Resolve a context factory from the global registry.
///
/// With a key, the factory registered under it is returned, created on first
/// request. Without one, a fresh unregistered factory is returned.
///
/// # Examples
///
/// ```rust
/// use module_context::resolve;
///
/// let condition = resolve(Some("condition"));
/// assert_eq!(condition.cache_reference_name(), Some("condition"));
/// assert_ne!(resolve(None), resolve(None));
/// ```
pub fn resolve(cache_reference_name: Option<&str>) -> ContextFactory {
    Registry::global().resolve(cache_reference_name)
}

/// Wrap a target with a fresh anonymous factory from the global registry.
///
/// This is the constructor-style entry point: the returned wrapper does not
/// share its cache with any other wrapper.
///
/// # Examples
///
/// ```rust
/// use module_context::{wrap, Arguments};
///
/// let wrapped = wrap(|_args: Arguments| Ok::<_, ()>(1), Some("one"));
/// assert_eq!(*wrapped.call(Arguments::new()).unwrap(), 1);
/// assert!(wrapped.context().factory().is_cached("one"));
/// ```
pub fn wrap<T>(target: T, cache_name: Option<&str>) -> WrappedTarget<T> {
    Registry::global().wrap(target, cache_name)
}
