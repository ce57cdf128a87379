use module_context::{Arguments, NamedFn, Registry, Settings, DEBUG_ENV_VAR};
use serial_test::serial;
use std::convert::Infallible;
use std::env;
use std::sync::Arc;

fn template() -> NamedFn<impl Fn(Arguments) -> Result<Vec<u8>, Infallible>> {
    NamedFn::new("template", |_args: Arguments| {
        Ok::<_, Infallible>(Vec::<u8>::new())
    })
}

#[test]
#[serial]
fn test_debug_flag_from_environment() {
    env::set_var(DEBUG_ENV_VAR, "1");
    let registry = Registry::from_env();
    env::remove_var(DEBUG_ENV_VAR);

    assert!(registry.settings().debug);
    assert!(registry.resolve(Some("debugged")).is_debug());
    assert!(!Registry::from_env().settings().debug);
}

#[test]
fn test_non_referenced_results_are_recorded_for_inspection() {
    let registry = Registry::with_settings(Settings::default().with_debug(true));
    let factory = registry.resolve(Some("views"));
    let wrapped = factory.wrap(template(), None);

    let first = wrapped.call(Arguments::new()).unwrap();
    let second = wrapped.call(Arguments::new()).unwrap();

    // Recording does not turn uncached calls into cached ones
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(factory.is_empty());

    assert_eq!(factory.debug_entries(), vec!["template 1", "template 2"]);
    assert_eq!(factory.counters().non_referenced, Some(2));
    assert!(Arc::ptr_eq(
        &factory.debug_get::<Vec<u8>>("template 1").unwrap(),
        &first
    ));
}

#[test]
fn test_counter_sentinel_without_debug() {
    let factory = Registry::new().resolve(Some("quiet"));
    let wrapped = factory.wrap(template(), None);
    wrapped.call(Arguments::new()).unwrap();

    assert!(!factory.is_debug());
    assert_eq!(factory.counters().non_referenced, None);
    assert!(factory.debug_entries().is_empty());
}

#[test]
fn test_cached_calls_are_not_debug_entries() {
    let registry = Registry::with_settings(Settings::default().with_debug(true));
    let factory = registry.resolve(None);
    let wrapped = factory.wrap(template(), Some("page"));

    wrapped.call(Arguments::new()).unwrap();
    wrapped.call(Arguments::new()).unwrap();

    assert!(factory.debug_entries().is_empty());
    assert_eq!(factory.counters().cached, 1);
    assert_eq!(factory.counters().non_referenced, Some(0));
}
