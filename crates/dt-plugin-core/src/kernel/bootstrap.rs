use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::container::{Container, Registrar};
use crate::hooks::HookBus;
use crate::host::HostServices;
use crate::http::{Renderer, Request};
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::plugin::Plugin;
use crate::providers::{BootContext, ConfigServiceProvider, PluginServiceProvider, ProviderSet};
use crate::support::PluginPaths;

/// Composition root: owns the container and the hook bus, registers every
/// provider, then boots them.
pub struct Application {
    root: PathBuf,
    container: Arc<Container>,
    hooks: HookBus,
    providers: ProviderSet,
    request: Option<Request>,
    renderer: Option<Arc<dyn Renderer>>,
    booted: bool,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("root", &self.root)
            .field("providers", &self.providers)
            .field("booted", &self.booted)
            .finish_non_exhaustive()
    }
}

impl Application {
    /// An application for the plugin rooted at `root`, talking to the host
    /// through `services`.
    pub fn new(root: impl Into<PathBuf>, services: HostServices) -> Self {
        Self {
            root: root.into(),
            container: Arc::new(Container::new()),
            hooks: HookBus::new(),
            providers: ProviderSet::new().with(PluginServiceProvider::new(services)),
            request: None,
            renderer: None,
            booted: false,
        }
    }

    /// Use `request` as the current request instead of capturing one.
    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    /// Render responses with `renderer` instead of stdout.
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Register every provider, then boot every provider.
    pub async fn boot(&mut self) -> Result<()> {
        if self.booted {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::RunPreCheck,
                provider_name: None,
                message: "Application already booted".to_string(),
                source: None,
            });
        }
        log::info!("Booting {} v{} from {}", constants::PLUGIN_NAME, constants::VERSION, self.root.display());

        self.container.defer(Arc::new(ConfigServiceProvider::new(self.root.clone())))?;
        self.container.instance(Arc::new(self.hooks.clone()))?;
        let root = self.root.clone();
        self.container
            .singleton::<PluginPaths, _>(move |c| Ok(Arc::new(PluginPaths::from_config(root.clone(), &*c.get::<Config>()?))))?;

        self.providers.register_all(&Registrar::new(&self.container))?;

        if let Some(request) = self.request.take() {
            self.container.instance(Arc::new(request))?;
        }
        if let Some(renderer) = self.renderer.take() {
            self.container.instance::<dyn Renderer>(renderer)?;
        }

        let cx = BootContext::new(self.container.clone(), self.hooks.clone());
        self.providers.boot_all(&cx).await?;

        self.booted = true;
        log::info!("Booted providers: {}", self.providers.names().join(", "));
        Ok(())
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn hooks(&self) -> &HookBus {
        &self.hooks
    }

    /// Fire a host action. Returns the number of callbacks run.
    pub async fn fire(&self, name: &str, args: Value) -> Result<usize> {
        log::debug!("Firing action {}", name);
        self.hooks.do_action(name, args).await
    }

    /// Run a host filter.
    pub async fn filter(&self, name: &str, value: Value) -> Result<Value> {
        self.hooks.apply_filters(name, value).await
    }

    pub fn plugin(&self) -> Result<Arc<Plugin>> {
        self.container.get::<Plugin>()
    }
}
