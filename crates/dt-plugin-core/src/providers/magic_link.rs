use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::container::Registrar;
use crate::controllers::magic_link::starter_app;
use crate::hooks::{sync_filter, HookBus, DEFAULT_PRIORITY};
use crate::host::PostMetaStore;
use crate::kernel::constants::MAGIC_URL_TYPES_FILTER;
use crate::kernel::error::Result;
use crate::magic_link::MagicLinks;
use crate::providers::{Boot, BootContext, Register};

/// Magic-link lookup and URL service, plus registration of the bundled
/// starter app.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicLinkServiceProvider;

impl Register for MagicLinkServiceProvider {
    fn name(&self) -> &'static str {
        "MagicLinkServiceProvider"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar.singleton::<MagicLinks, _>(|c| {
            let site_url = c.get::<Config>()?.get_or("plugin.site_url", String::new());
            let hooks = HookBus::clone(&*c.get::<HookBus>()?);
            Ok(Arc::new(MagicLinks::new(hooks, c.get::<dyn PostMetaStore>()?, &site_url)))
        })
    }
}

#[async_trait]
impl Boot for MagicLinkServiceProvider {
    async fn boot(&self, cx: &BootContext) -> Result<()> {
        let app = starter_app();
        log::debug!("Registering magic link app {}/{}", app.root, app.kind);
        cx.hooks
            .add_filter(MAGIC_URL_TYPES_FILTER, DEFAULT_PRIORITY, sync_filter(move |apps| app.register_into(apps)))
            .await?;
        Ok(())
    }
}
