use std::sync::Arc;

use async_trait::async_trait;

use crate::container::Registrar;
use crate::host::HostServices;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::plugin::Plugin;
use crate::providers::{
    AdminServiceProvider, Boot, BootContext, HostServiceProvider, MagicLinkServiceProvider, OptionsServiceProvider,
    ProviderSet, Register, RouteServiceProvider, TemplateServiceProvider, ValidationServiceProvider,
};

/// The plugin's root provider: binds [`Plugin`] and composes every other
/// provider in a fixed order.
#[derive(Debug)]
pub struct PluginServiceProvider {
    providers: ProviderSet,
}

impl PluginServiceProvider {
    pub fn new(services: HostServices) -> Self {
        let providers = ProviderSet::new()
            .with(HostServiceProvider::new(services))
            .with(OptionsServiceProvider)
            .with(TemplateServiceProvider)
            .with(ValidationServiceProvider)
            .with(RouteServiceProvider)
            .with(MagicLinkServiceProvider)
            .with(AdminServiceProvider);
        Self { providers }
    }

    /// Child provider names, in order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.names()
    }
}

impl Register for PluginServiceProvider {
    fn name(&self) -> &'static str {
        "PluginServiceProvider"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar.singleton::<Plugin, _>(|c| Ok(Arc::new(Plugin::from_container(c)?)))?;
        self.providers.register_all(registrar)
    }
}

#[async_trait]
impl Boot for PluginServiceProvider {
    async fn boot(&self, cx: &BootContext) -> Result<()> {
        self.providers.boot_all(cx).await?;
        let plugin = cx.container.get::<Plugin>()?;
        plugin
            .init()
            .await
            .map_err(|e| Error::lifecycle(KernelLifecyclePhase::Init, self.name(), e))
    }
}
