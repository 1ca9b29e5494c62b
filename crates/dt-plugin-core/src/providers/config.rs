use std::any::TypeId;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::defaults::plugin_defaults;
use crate::config::{Config, ConfigLoader};
use crate::container::Registrar;
use crate::kernel::error::Result;
use crate::providers::{DeferredProvider, Register};

/// Builds the plugin configuration: built-in defaults, then every
/// declaration file in the configuration directory. Deferred: nothing is
/// read until something asks for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigServiceProvider {
    root: PathBuf,
}

impl ConfigServiceProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn load(&self) -> Result<Config> {
        let mut config = Config::from_value(plugin_defaults())?;
        let dir = self.root.join(config.get_or("plugin.paths.config", "config".to_string()));
        let merged = ConfigLoader::load_dir(&dir, &mut config)?;
        log::info!("Loaded configuration ({} declaration files from {:?})", merged, dir);
        Ok(config)
    }
}

impl Register for ConfigServiceProvider {
    fn name(&self) -> &'static str {
        "ConfigServiceProvider"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        let provider = self.clone();
        registrar.singleton::<Config, _>(move |_| Ok(Arc::new(provider.load()?)))
    }
}

impl DeferredProvider for ConfigServiceProvider {
    fn provides(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Config>()]
    }
}
