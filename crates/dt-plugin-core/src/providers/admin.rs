use std::sync::Arc;

use async_trait::async_trait;

use crate::admin::settings::{register_plugin_dependencies, Settings};
use crate::container::Registrar;
use crate::kernel::error::Result;
use crate::providers::{Boot, BootContext, Register};

/// The admin settings screen and the plugin dependency manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminServiceProvider;

impl Register for AdminServiceProvider {
    fn name(&self) -> &'static str {
        "AdminServiceProvider"
    }

    fn register(&self, _registrar: &Registrar<'_>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Boot for AdminServiceProvider {
    async fn boot(&self, cx: &BootContext) -> Result<()> {
        let settings = Arc::new(Settings::new(cx.container.clone(), cx.hooks.clone()));
        settings.init().await?;
        register_plugin_dependencies(&cx.container)
    }
}
