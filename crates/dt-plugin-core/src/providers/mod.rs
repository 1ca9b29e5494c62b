//! # Service Providers
//!
//! Providers are units of startup configuration with two phases:
//!
//! - **Register** ([`Register`]): add bindings through a [`Registrar`]. No
//!   service can be resolved here, so providers never depend on each other's
//!   registration order.
//! - **Boot** ([`Boot`]): runs after every provider registered. Services may be
//!   resolved and host hooks attached.
//!
//! The composition root ([`crate::kernel::Application`]) calls register on all
//! providers before boot on any. [`ProviderSet`] is a statically declared,
//! ordered composite; order is declaration order, nothing more.
pub mod admin;
pub mod config;
pub mod host;
pub mod magic_link;
pub mod options;
pub mod plugin;
pub mod route;
pub mod template;
pub mod validation;

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::container::{Container, Registrar};
use crate::hooks::HookBus;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};

pub use admin::AdminServiceProvider;
pub use config::ConfigServiceProvider;
pub use host::HostServiceProvider;
pub use magic_link::MagicLinkServiceProvider;
pub use options::OptionsServiceProvider;
pub use plugin::PluginServiceProvider;
pub use route::RouteServiceProvider;
pub use template::TemplateServiceProvider;
pub use validation::ValidationServiceProvider;

/// Registration capability.
pub trait Register: Send + Sync {
    /// Name used in logs and lifecycle errors
    fn name(&self) -> &'static str;

    /// Add bindings to the container.
    fn register(&self, registrar: &Registrar<'_>) -> Result<()>;
}

/// Post-registration capability.
#[async_trait]
pub trait Boot: Send + Sync {
    /// Resolve services and attach host hooks.
    async fn boot(&self, cx: &BootContext) -> Result<()>;
}

/// A provider registered lazily, the first time one of its keys is requested.
pub trait DeferredProvider: Register {
    /// Keys this provider binds
    fn provides(&self) -> Vec<TypeId>;
}

/// A provider carrying both capabilities, as stored in a [`ProviderSet`].
pub trait ServiceProvider: Register + Boot {}

impl<T: Register + Boot> ServiceProvider for T {}

/// Handles available during the boot phase.
#[derive(Debug, Clone)]
pub struct BootContext {
    pub container: Arc<Container>,
    pub hooks: HookBus,
}

impl BootContext {
    pub fn new(container: Arc<Container>, hooks: HookBus) -> Self {
        Self { container, hooks }
    }
}

/// Ordered list of providers, registered and booted in declaration order.
#[derive(Default)]
pub struct ProviderSet {
    providers: Vec<Arc<dyn ServiceProvider>>,
}

impl fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider, builder style.
    pub fn with<P: ServiceProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn push(&mut self, provider: Arc<dyn ServiceProvider>) {
        self.providers.push(provider);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Register every provider in order.
    pub fn register_all(&self, registrar: &Registrar<'_>) -> Result<()> {
        for provider in &self.providers {
            log::debug!("Registering provider {}", provider.name());
            provider
                .register(registrar)
                .map_err(|e| Error::lifecycle(KernelLifecyclePhase::Register, provider.name(), e))?;
        }
        Ok(())
    }

    /// Boot every provider in order.
    pub async fn boot_all(&self, cx: &BootContext) -> Result<()> {
        for provider in &self.providers {
            log::debug!("Booting provider {}", provider.name());
            provider
                .boot(cx)
                .await
                .map_err(|e| Error::lifecycle(KernelLifecyclePhase::Boot, provider.name(), e))?;
        }
        Ok(())
    }
}
