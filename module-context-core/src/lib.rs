//! # Module Context Core
//!
//! Core types for on-demand memoization of callable and constructible targets.
//!
//! A [`Registry`] hands out [`ContextFactory`]s, either registered under a key
//! (so every request for that key shares one cache) or anonymous (private to
//! the caller). A factory wraps targets into [`WrappedTarget`]s; calling or
//! constructing a wrapped target consults the factory's store before running
//! the target.
//!
//! ## Features
//!
//! - **Named factories**: one shared cache per registry key, created on first request
//! - **Write-once slots**: the first result stored under a cache name is returned forever after
//! - **Uncached wrappers**: without a cache name every call runs the target
//! - **Instance names**: targets receive the cache name they populate as `methodInstanceName`
//! - **Debug bookkeeping**: optional inspection of uncached results (see [`Settings`])
//! - **Counters**: per-factory cache writes and hits
//!
//! ## Module Organization
//!
//! - [`Arguments`] - positional JSON arguments and the instance-name merge
//! - [`Callable`] / [`Constructible`] - the two entry points a target can offer
//! - [`Context`] - per-wrap state and the cache algorithm
//! - [`ContextFactory`] - shared store, counters and introspection
//! - [`WrappedTarget`] - the wrapper callers invoke
//! - [`Registry`] - keyed factories
//!
//! ## Quick Start
//!
//! ```
//! use module_context_core::{Arguments, Registry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! let factory = registry.resolve(Some("middleware"));
//!
//! let router = factory.wrap(
//!     |args: Arguments| {
//!         let name = args.method_instance_name().unwrap_or("anonymous").to_string();
//!         Ok::<_, ()>(name)
//!     },
//!     Some("router"),
//! );
//!
//! let first = router.call(Arguments::from(json!({}))).unwrap();
//! let again = router.call(Arguments::from(json!({}))).unwrap();
//!
//! assert_eq!(first.as_str(), "router");
//! assert!(Arc::ptr_eq(&first, &again));
//! ```
mod arguments;
mod context;
mod counters;
mod error;
mod factory;
mod registry;
mod settings;
mod target;
mod wrapped;

pub use arguments::{Arguments, METHOD_INSTANCE_NAME};
pub use context::Context;
pub use counters::{CounterSnapshot, TargetCounter};
pub use error::InvokeError;
pub use factory::ContextFactory;
pub use registry::Registry;
pub use settings::{Settings, DEBUG_ENV_VAR};
pub use target::{Callable, Constructible, NamedFn};
pub use wrapped::WrappedTarget;

pub use serde_json::{json, Value};
