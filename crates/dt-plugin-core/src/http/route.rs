use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::container::Container;
use crate::http::declarations::RouteDeclarations;
use crate::http::middleware::{HandlerRegistry, MiddlewareRegistry};
use crate::http::renderer::Renderer;
use crate::http::router::Router;
use crate::http::{Request, Response};
use crate::kernel::error::Result;
use crate::support::paths::PluginPaths;

/// Fluent request-handling pipeline: pick a request, collect routes and
/// middleware, dispatch once, render.
///
/// ```ignore
/// Route::from_container(&container)?
///     .as_uri("/wp-admin/dt-plugin/general")
///     .from_route_file("settings.toml")?
///     .render()?;
/// ```
pub struct Route {
    router: Router,
    request: Request,
    renderer: Arc<dyn Renderer>,
    routes_dir: PathBuf,
    response: Option<Response>,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("router", &self.router)
            .field("request", &self.request)
            .field("routes_dir", &self.routes_dir)
            .field("dispatched", &self.response.is_some())
            .finish()
    }
}

impl Route {
    pub fn new(router: Router, request: Request, renderer: Arc<dyn Renderer>, routes_dir: PathBuf) -> Self {
        Self {
            router,
            request,
            renderer,
            routes_dir,
            response: None,
        }
    }

    /// A pipeline over the container's registries, current request and
    /// renderer.
    pub fn from_container(container: &Container) -> Result<Self> {
        let router = Router::new(container.get::<HandlerRegistry>()?, container.get::<MiddlewareRegistry>()?);
        let request = Request::clone(&*container.get::<Request>()?);
        let renderer = container.get::<dyn Renderer>()?;
        let routes_dir = container.get::<PluginPaths>()?.routes_path("");
        Ok(Self::new(router, request, renderer, routes_dir))
    }

    /// Aim the request at another URI.
    pub fn as_uri(mut self, uri: &str) -> Self {
        self.request = self.request.with_path(uri);
        self
    }

    pub fn with_request(mut self, request: Request) -> Self {
        self.request = request;
        self
    }

    /// Add router-level middleware by name.
    pub fn with_middleware<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.router.middleware(name.as_ref())?;
        }
        Ok(self)
    }

    /// Register routes programmatically.
    pub fn with_routes<F>(mut self, register: F) -> Result<Self>
    where
        F: FnOnce(&mut Router) -> Result<()>,
    {
        register(&mut self.router)?;
        Ok(self)
    }

    /// Load a declaration file from the plugin's routes directory.
    pub fn from_route_file(self, file: &str) -> Result<Self> {
        let path = self.routes_dir.join(file);
        self.from_file(path)
    }

    pub fn from_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let declarations = RouteDeclarations::from_file(path.as_ref())?;
        self.router.load(&declarations)?;
        Ok(self)
    }

    /// Dispatch the request and keep the response.
    pub fn dispatch(&mut self) -> Result<&Response> {
        let response = self.router.dispatch(&self.request)?;
        Ok(self.response.insert(response))
    }

    /// Render the response, dispatching first only if nothing has been
    /// dispatched yet.
    pub fn render(&mut self) -> Result<()> {
        let response = match self.response.clone() {
            Some(response) => response,
            None => self.dispatch()?.clone(),
        };
        self.renderer.render(response)
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn has_dispatched(&self) -> bool {
        self.response.is_some()
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}
