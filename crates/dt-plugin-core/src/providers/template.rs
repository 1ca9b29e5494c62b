use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::container::Registrar;
use crate::kernel::error::Result;
use crate::providers::{Boot, BootContext, Register};
use crate::support::PluginPaths;
use crate::view::{Template, ViewEngine};

/// View engine over the plugin's views directory, and the layout-wrapping
/// template service.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateServiceProvider;

impl Register for TemplateServiceProvider {
    fn name(&self) -> &'static str {
        "TemplateServiceProvider"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar.singleton::<ViewEngine, _>(|c| {
            let views = c.get::<PluginPaths>()?.views_path("");
            Ok(Arc::new(ViewEngine::from_directory(&views)?))
        })?;
        registrar.singleton::<Template, _>(|c| {
            let layout = c.get::<Config>()?.get_or("templates.layout", "layouts/template".to_string());
            Ok(Arc::new(Template::new(c.get::<ViewEngine>()?, &layout)))
        })
    }
}

#[async_trait]
impl Boot for TemplateServiceProvider {
    async fn boot(&self, cx: &BootContext) -> Result<()> {
        let engine = cx.container.get::<ViewEngine>()?;
        log::debug!("Views available: {}", engine.names().join(", "));
        Ok(())
    }
}
