use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::container::{Container, ContainerError, Lifetime, Registrar};
use crate::kernel::error::{Error, Result};
use crate::providers::{DeferredProvider, Register};

#[derive(Debug, PartialEq)]
struct Greeting(String);

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

#[test]
fn test_singleton_resolves_same_instance() {
    let container = Container::new();
    container.singleton::<Greeting, _>(|_| Ok(Arc::new(Greeting("hi".into())))).unwrap();

    let first = container.get::<Greeting>().unwrap();
    let second = container.get::<Greeting>().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(container.is_resolved::<Greeting>());
    assert_eq!(container.lifetime_of::<Greeting>(), Some(Lifetime::Singleton));
}

#[test]
fn test_bind_resolves_fresh_instances() {
    let container = Container::new();
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    container
        .bind::<Greeting, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Greeting("hi".into())))
        })
        .unwrap();

    let first = container.get::<Greeting>().unwrap();
    let second = container.get::<Greeting>().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first, second);
    assert_eq!(built.load(Ordering::SeqCst), 2);
    assert_eq!(container.lifetime_of::<Greeting>(), Some(Lifetime::Transient));
}

#[test]
fn test_instance_is_shared() {
    let container = Container::new();
    let greeting = Arc::new(Greeting("shared".into()));
    container.instance(greeting.clone()).unwrap();

    assert!(Arc::ptr_eq(&greeting, &container.get::<Greeting>().unwrap()));
    assert!(container.is_resolved::<Greeting>());
}

#[test]
fn test_trait_object_services() {
    let container = Container::new();
    container.instance::<dyn Clock>(Arc::new(FixedClock(42))).unwrap();

    assert_eq!(container.get::<dyn Clock>().unwrap().now(), 42);
    assert!(container.has::<dyn Clock>());
    assert!(!container.has::<FixedClock>());
}

#[test]
fn test_factories_resolve_their_dependencies() {
    let container = Container::new();
    container.instance::<dyn Clock>(Arc::new(FixedClock(7))).unwrap();
    container
        .singleton::<Greeting, _>(|c| Ok(Arc::new(Greeting(format!("at {}", c.get::<dyn Clock>()?.now())))))
        .unwrap();

    assert_eq!(container.get::<Greeting>().unwrap().0, "at 7");
}

#[test]
fn test_missing_service_is_not_found() {
    let container = Container::new();
    let err = container.get::<Greeting>().unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::Container(ContainerError::NotFound { type_name }) => assert!(type_name.ends_with("Greeting")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_failed_singleton_factory_is_retried() {
    let container = Container::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    container
        .singleton::<Greeting, _>(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("not yet".into())
            } else {
                Ok(Arc::new(Greeting("ok".into())))
            }
        })
        .unwrap();

    assert!(container.get::<Greeting>().is_err());
    assert!(!container.is_resolved::<Greeting>());
    assert_eq!(container.get::<Greeting>().unwrap().0, "ok");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_get_or_default_falls_back_without_binding() {
    #[derive(Default)]
    struct Counter(u32);

    let container = Container::new();
    assert_eq!(container.get_or_default::<Counter>().unwrap().0, 0);

    container.instance(Arc::new(Counter(3))).unwrap();
    assert_eq!(container.get_or_default::<Counter>().unwrap().0, 3);
}

struct GreetingProvider {
    registered: Arc<AtomicUsize>,
}

impl Register for GreetingProvider {
    fn name(&self) -> &'static str {
        "GreetingProvider"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        self.registered.fetch_add(1, Ordering::SeqCst);
        registrar.singleton::<Greeting, _>(|_| Ok(Arc::new(Greeting("deferred".into()))))
    }
}

impl DeferredProvider for GreetingProvider {
    fn provides(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Greeting>()]
    }
}

#[test]
fn test_deferred_provider_registers_on_first_request() {
    let container = Container::new();
    let registered = Arc::new(AtomicUsize::new(0));
    container
        .defer(Arc::new(GreetingProvider { registered: registered.clone() }))
        .unwrap();

    assert!(container.has::<Greeting>());
    assert_eq!(registered.load(Ordering::SeqCst), 0);

    assert_eq!(container.get::<Greeting>().unwrap().0, "deferred");
    container.get::<Greeting>().unwrap();
    assert_eq!(registered.load(Ordering::SeqCst), 1);
}

#[test]
fn test_rebinding_replaces_previous_binding() {
    let container = Container::new();
    container.instance(Arc::new(Greeting("old".into()))).unwrap();
    container.instance(Arc::new(Greeting("new".into()))).unwrap();

    assert_eq!(container.get::<Greeting>().unwrap().0, "new");
    assert_eq!(container.registered_names().len(), 1);
}
