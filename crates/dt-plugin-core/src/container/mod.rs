//! # Service Container
//!
//! A registry resolving strongly typed keys to shared (`singleton`) or fresh
//! (`bind`) instances. Keys are the `TypeId` of the service type, so trait
//! object services (`dyn OptionStore`) are keyed exactly like concrete ones.
//!
//! Factories receive the container and resolve their own dependencies from
//! it; there is no reflection-based auto-wiring. A binding that is missing
//! at resolution time is looked up among the deferred providers before the
//! lookup fails with [`ContainerError::NotFound`].
pub mod error;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use crate::kernel::error::Result;
use crate::providers::DeferredProvider;
pub use error::ContainerError;

/// Type-erased `Arc<T>` as stored by the container
type StoredArc = Box<dyn Any + Send + Sync>;

/// Type-erased factory closure
type Factory = Arc<dyn Fn(&Container) -> Result<StoredArc> + Send + Sync>;

/// Lifetime of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Factory result cached after the first resolution
    Singleton,
    /// Factory invoked on every resolution
    Transient,
}

struct Binding {
    type_name: &'static str,
    lifetime: Lifetime,
    factory: Factory,
    cached: OnceLock<StoredArc>,
}

impl Binding {
    fn resolve<T>(&self, container: &Container) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.lifetime {
            Lifetime::Transient => {
                let produced = (self.factory)(container)?;
                downcast::<T>(&produced, self.type_name)
            }
            Lifetime::Singleton => {
                if let Some(existing) = self.cached.get() {
                    return downcast::<T>(existing, self.type_name);
                }
                let produced = (self.factory)(container)?;
                // First writer wins; a factory that resolved itself re-entrantly
                // has already populated the cell.
                let _ = self.cached.set(produced);
                match self.cached.get() {
                    Some(cached) => downcast::<T>(cached, self.type_name),
                    None => Err(ContainerError::TypeMismatch { type_name: self.type_name }.into()),
                }
            }
        }
    }
}

fn downcast<T>(stored: &StoredArc, type_name: &'static str) -> Result<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    stored
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| ContainerError::TypeMismatch { type_name }.into())
}

/// Process-wide service registry, owned by the composition root and handed
/// out by `Arc` to whatever needs it.
#[derive(Default)]
pub struct Container {
    bindings: RwLock<HashMap<TypeId, Arc<Binding>>>,
    deferred: Mutex<Vec<Arc<dyn DeferredProvider>>>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = self.bindings.read().map(|b| b.len()).unwrap_or(0);
        let deferred = self.deferred.lock().map(|d| d.len()).unwrap_or(0);
        f.debug_struct("Container")
            .field("bindings", &bound)
            .field("deferred_providers", &deferred)
            .finish()
    }
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transient factory: every `get` produces a fresh instance.
    pub fn bind<T, F>(&self, factory: F) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.insert::<T>(Lifetime::Transient, erase::<T, F>(factory), None)
    }

    /// Register a factory whose result is cached after the first resolution.
    pub fn singleton<T, F>(&self, factory: F) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.insert::<T>(Lifetime::Singleton, erase::<T, F>(factory), None)
    }

    /// Register an already constructed shared instance.
    pub fn instance<T>(&self, value: Arc<T>) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let for_factory = value.clone();
        let factory = erase::<T, _>(move |_: &Container| Ok(for_factory.clone()));
        self.insert::<T>(Lifetime::Singleton, factory, Some(Box::new(value)))
    }

    /// Attach a provider that is only registered once one of the keys it
    /// `provides()` is requested.
    pub fn defer(&self, provider: Arc<dyn DeferredProvider>) -> Result<()> {
        let mut deferred = self.deferred.lock().map_err(|_| poisoned("deferred providers"))?;
        log::debug!("Deferring provider {}", provider.name());
        deferred.push(provider);
        Ok(())
    }

    /// Resolve a service.
    pub fn get<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        let binding = match self.binding(&type_id)? {
            Some(binding) => binding,
            None => {
                self.register_deferred(&type_id)?;
                self.binding(&type_id)?.ok_or(ContainerError::NotFound {
                    type_name: std::any::type_name::<T>(),
                })?
            }
        };
        binding.resolve::<T>(self)
    }

    /// Resolve a service, falling back to a fresh `T::default()` when no
    /// binding (and no deferred provider) exists for it. The fallback is not
    /// cached.
    pub fn get_or_default<T>(&self) -> Result<Arc<T>>
    where
        T: Default + Send + Sync + 'static,
    {
        match self.get::<T>() {
            Err(e) if e.is_not_found() => Ok(Arc::new(T::default())),
            other => other,
        }
    }

    /// Whether a binding (or a deferred provider) exists for `T`.
    pub fn has<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        let type_id = TypeId::of::<T>();
        let bound = self
            .bindings
            .read()
            .map(|b| b.contains_key(&type_id))
            .unwrap_or(false);
        bound
            || self
                .deferred
                .lock()
                .map(|d| d.iter().any(|p| p.provides().contains(&type_id)))
                .unwrap_or(false)
    }

    /// Whether a singleton for `T` has already been constructed.
    pub fn is_resolved<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.bindings
            .read()
            .ok()
            .and_then(|b| b.get(&TypeId::of::<T>()).map(|binding| binding.cached.get().is_some()))
            .unwrap_or(false)
    }

    /// Lifetime of the binding registered for `T`, if any.
    pub fn lifetime_of<T>(&self) -> Option<Lifetime>
    where
        T: ?Sized + 'static,
    {
        self.bindings
            .read()
            .ok()
            .and_then(|b| b.get(&TypeId::of::<T>()).map(|binding| binding.lifetime))
    }

    /// Type names of every registered binding, sorted.
    pub fn registered_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .bindings
            .read()
            .map(|b| b.values().map(|binding| binding.type_name).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    fn insert<T>(&self, lifetime: Lifetime, factory: Factory, cached: Option<StoredArc>) -> Result<()>
    where
        T: ?Sized + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let cell = OnceLock::new();
        if let Some(value) = cached {
            let _ = cell.set(value);
        }
        let binding = Arc::new(Binding { type_name, lifetime, factory, cached: cell });
        let mut bindings = self.bindings.write().map_err(|_| poisoned("bindings"))?;
        if bindings.insert(TypeId::of::<T>(), binding).is_some() {
            log::debug!("Rebinding service {}", type_name);
        }
        Ok(())
    }

    fn binding(&self, type_id: &TypeId) -> Result<Option<Arc<Binding>>> {
        let bindings = self.bindings.read().map_err(|_| poisoned("bindings"))?;
        Ok(bindings.get(type_id).cloned())
    }

    fn register_deferred(&self, type_id: &TypeId) -> Result<()> {
        let provider = {
            let mut deferred = self.deferred.lock().map_err(|_| poisoned("deferred providers"))?;
            match deferred.iter().position(|p| p.provides().contains(type_id)) {
                Some(index) => deferred.remove(index),
                None => return Ok(()),
            }
        };
        log::debug!("Registering deferred provider {}", provider.name());
        provider.register(&Registrar::new(self))
    }
}

fn erase<T, F>(factory: F) -> Factory
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
{
    Arc::new(move |container: &Container| -> Result<StoredArc> {
        let value: Arc<T> = factory(container)?;
        Ok(Box::new(value))
    })
}

fn poisoned(component: &str) -> ContainerError {
    ContainerError::Poisoned { component: component.to_string() }
}

/// Registration-only view of a [`Container`] handed to providers during the
/// register phase. It can add bindings but cannot resolve services, which
/// keeps registration independent of provider order.
#[derive(Debug, Clone, Copy)]
pub struct Registrar<'a> {
    container: &'a Container,
}

impl<'a> Registrar<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub fn bind<T, F>(&self, factory: F) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.container.bind::<T, F>(factory)
    }

    pub fn singleton<T, F>(&self, factory: F) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.container.singleton::<T, F>(factory)
    }

    pub fn instance<T>(&self, value: Arc<T>) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.container.instance::<T>(value)
    }

    pub fn defer(&self, provider: Arc<dyn DeferredProvider>) -> Result<()> {
        self.container.defer(provider)
    }

    /// Whether `T` is already bound (registration order checks only).
    pub fn has<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.container.has::<T>()
    }
}

#[cfg(test)]
mod tests;
