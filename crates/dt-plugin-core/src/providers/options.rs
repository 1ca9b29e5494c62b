use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::container::Registrar;
use crate::host::OptionStore;
use crate::kernel::error::Result;
use crate::options::Options;
use crate::providers::{Boot, BootContext, Register};

#[derive(Debug, Clone, Copy, Default)]
pub struct OptionsServiceProvider;

impl Register for OptionsServiceProvider {
    fn name(&self) -> &'static str {
        "OptionsServiceProvider"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar.singleton::<Options, _>(|c| {
            let config = c.get::<Config>()?;
            Ok(Arc::new(Options::from_config(c.get::<dyn OptionStore>()?, &config)))
        })
    }
}

#[async_trait]
impl Boot for OptionsServiceProvider {
    async fn boot(&self, _cx: &BootContext) -> Result<()> {
        Ok(())
    }
}
