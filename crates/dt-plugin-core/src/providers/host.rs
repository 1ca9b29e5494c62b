use std::sync::Arc;

use async_trait::async_trait;

use crate::container::Registrar;
use crate::host::{
    AdminMenu, AdminNotices, CurrentUser, DataStore, HostServices, NonceVerifier, OptionStore, PluginInstaller,
    PostMetaStore, RewriteRules, ThemeInfo,
};
use crate::kernel::error::Result;
use crate::providers::{Boot, BootContext, Register};

/// Binds every host seam under its trait.
#[derive(Debug, Clone)]
pub struct HostServiceProvider {
    services: HostServices,
}

impl HostServiceProvider {
    pub fn new(services: HostServices) -> Self {
        Self { services }
    }
}

impl Register for HostServiceProvider {
    fn name(&self) -> &'static str {
        "HostServiceProvider"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        let s = &self.services;
        registrar.instance::<dyn OptionStore>(s.options.clone())?;
        registrar.instance::<dyn NonceVerifier>(s.nonces.clone())?;
        registrar.instance::<dyn CurrentUser>(s.user.clone())?;
        registrar.instance::<dyn AdminMenu>(s.menu.clone())?;
        registrar.instance::<dyn AdminNotices>(s.notices.clone())?;
        registrar.instance::<dyn ThemeInfo>(s.theme.clone())?;
        registrar.instance::<dyn RewriteRules>(s.rewrites.clone())?;
        registrar.instance::<dyn PluginInstaller>(s.installer.clone())?;
        registrar.instance::<dyn PostMetaStore>(s.post_meta.clone())?;
        registrar.instance::<dyn DataStore>(s.data.clone())?;
        registrar.instance(Arc::new(self.services.clone()))
    }
}

#[async_trait]
impl Boot for HostServiceProvider {
    async fn boot(&self, _cx: &BootContext) -> Result<()> {
        Ok(())
    }
}
