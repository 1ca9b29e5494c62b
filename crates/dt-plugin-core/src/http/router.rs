use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::http::declarations::RouteDeclarations;
use crate::http::error::HttpError;
use crate::http::middleware::{Handler, HandlerRegistry, Middleware, MiddlewareRegistry, Next};
use crate::http::pattern::RoutePattern;
use crate::http::{Request, Response};
use crate::kernel::error::Result;

/// Methods covered by [`Router::any`]
pub const ANY_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// A registered route. Never mutated by dispatch.
pub struct RouteEntry {
    method: Method,
    pattern: RoutePattern,
    handler_name: String,
    handler: Arc<dyn Handler>,
    middleware_names: Vec<String>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("handler", &self.handler_name)
            .field("middleware", &self.middleware_names)
            .finish()
    }
}

impl RouteEntry {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    pub fn middleware_names(&self) -> &[String] {
        &self.middleware_names
    }
}

/// Maps (method, path) to a handler behind a middleware chain.
///
/// The most specific matching pattern wins; equally specific patterns are
/// tried in registration order. Global middleware runs before route
/// middleware, each in the order it was added.
pub struct Router {
    routes: Vec<RouteEntry>,
    global: Vec<(String, Arc<dyn Middleware>)>,
    handlers: Arc<HandlerRegistry>,
    registry: Arc<MiddlewareRegistry>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let global: Vec<&str> = self.global.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("middleware", &global)
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Arc::default(), Arc::default())
    }
}

impl Router {
    pub fn new(handlers: Arc<HandlerRegistry>, registry: Arc<MiddlewareRegistry>) -> Self {
        Self {
            routes: Vec::new(),
            global: Vec::new(),
            handlers,
            registry,
        }
    }

    /// Register a route against named handler and middleware.
    pub fn register(&mut self, method: Method, pattern: &str, handler: &str, middleware: &[&str]) -> Result<()> {
        let resolved_handler = self.handlers.get(handler)?;
        let resolved = middleware
            .iter()
            .map(|name| self.registry.resolve(name))
            .collect::<Result<Vec<_>>>()?;
        self.push(RouteEntry {
            method,
            pattern: RoutePattern::parse(pattern)?,
            handler_name: handler.to_string(),
            handler: resolved_handler,
            middleware_names: middleware.iter().map(|m| m.to_string()).collect(),
            middleware: resolved,
        });
        Ok(())
    }

    pub fn get(&mut self, pattern: &str, handler: &str) -> Result<()> {
        self.register(Method::GET, pattern, handler, &[])
    }

    pub fn post(&mut self, pattern: &str, handler: &str) -> Result<()> {
        self.register(Method::POST, pattern, handler, &[])
    }

    pub fn put(&mut self, pattern: &str, handler: &str) -> Result<()> {
        self.register(Method::PUT, pattern, handler, &[])
    }

    pub fn patch(&mut self, pattern: &str, handler: &str) -> Result<()> {
        self.register(Method::PATCH, pattern, handler, &[])
    }

    pub fn delete(&mut self, pattern: &str, handler: &str) -> Result<()> {
        self.register(Method::DELETE, pattern, handler, &[])
    }

    /// Register `handler` for every method in [`ANY_METHODS`].
    pub fn any(&mut self, pattern: &str, handler: &str) -> Result<()> {
        for method in ANY_METHODS {
            self.register(method, pattern, handler, &[])?;
        }
        Ok(())
    }

    /// Register a route with an unnamed handler and middleware.
    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Arc<dyn Handler>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Result<()> {
        self.push(RouteEntry {
            method,
            pattern: RoutePattern::parse(pattern)?,
            handler_name: "closure".to_string(),
            handler,
            middleware_names: Vec::new(),
            middleware,
        });
        Ok(())
    }

    /// Add router-level middleware by name (`name` or `name:argument`).
    pub fn middleware(&mut self, spec: &str) -> Result<()> {
        let middleware = self.registry.resolve(spec)?;
        self.global.push((spec.to_string(), middleware));
        Ok(())
    }

    /// Add an unnamed router-level middleware.
    pub fn push_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.global.push(("closure".to_string(), middleware));
    }

    /// Register every route of a declaration file. The file's group
    /// middleware precedes each route's own.
    pub fn load(&mut self, declarations: &RouteDeclarations) -> Result<()> {
        for route in &declarations.routes {
            let method = Method::from_bytes(route.method.to_ascii_uppercase().as_bytes())
                .map_err(|_| HttpError::InvalidMethod { method: route.method.clone() })?;
            let middleware: Vec<&str> = declarations
                .middleware
                .iter()
                .chain(route.middleware.iter())
                .map(String::as_str)
                .collect();
            self.register(method, &route.path, &route.handler, &middleware)?;
        }
        Ok(())
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    fn push(&mut self, entry: RouteEntry) {
        log::debug!("Registered route {} {} -> {}", entry.method, entry.pattern, entry.handler_name);
        self.routes.push(entry);
    }

    /// Dispatch a request.
    ///
    /// No matching path gives `404` without invoking anything; a matching
    /// path registered for other methods gives `405` with `Allow`.
    pub fn dispatch(&self, request: &Request) -> Result<Response> {
        let mut best: Option<(&RouteEntry, _)> = None;
        let mut allowed: Vec<Method> = Vec::new();

        for entry in &self.routes {
            let Some(params) = entry.pattern.matches(request.path()) else { continue };
            if entry.method != *request.method() {
                if !allowed.contains(&entry.method) {
                    allowed.push(entry.method.clone());
                }
                continue;
            }
            let beats_current = match &best {
                Some((current, _)) => entry.pattern.specificity() > current.pattern.specificity(),
                None => true,
            };
            if beats_current {
                best = Some((entry, params));
            }
        }

        let Some((entry, params)) = best else {
            if allowed.is_empty() {
                log::debug!("No route for {} {}", request.method(), request.path());
                return Ok(Response::not_found());
            }
            return Ok(Response::method_not_allowed(&allowed));
        };

        log::debug!("Dispatching {} {} to {}", request.method(), request.path(), entry.handler_name);
        let request = request.clone().with_route_params(params);
        let chain: Vec<Arc<dyn Middleware>> = self
            .global
            .iter()
            .map(|(_, middleware)| middleware.clone())
            .chain(entry.middleware.iter().cloned())
            .collect();
        Next::new(&chain, entry.handler.as_ref()).run(&request, Response::new())
    }
}
