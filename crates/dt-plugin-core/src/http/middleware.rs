//! Handlers, the middleware chain, and the named registries route
//! declarations resolve against.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::host::{CurrentUser, NonceVerifier};
use crate::http::error::HttpError;
use crate::http::{Request, Response};
use crate::kernel::error::Result;

/// Body returned when a request fails forgery verification
pub const NONCE_FAILURE_MESSAGE: &str = "Could not verify request.";

/// Terminal step of a middleware chain.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request, response: Response) -> Result<Response>;
}

/// A step of the chain. Continue with `next.run(..)`; return without
/// calling it to short-circuit.
pub trait Middleware: Send + Sync {
    fn handle(&self, request: &Request, response: Response, next: Next<'_>) -> Result<Response>;
}

/// The remainder of a middleware chain.
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub fn new(middleware: &'a [Arc<dyn Middleware>], handler: &'a dyn Handler) -> Self {
        Self { middleware, handler }
    }

    pub fn run(self, request: &Request, response: Response) -> Result<Response> {
        match self.middleware.split_first() {
            Some((current, rest)) => current.handle(request, response, Next::new(rest, self.handler)),
            None => self.handler.handle(request, response),
        }
    }
}

struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: Fn(&Request, Response) -> Result<Response> + Send + Sync,
{
    fn handle(&self, request: &Request, response: Response) -> Result<Response> {
        (self.0)(request, response)
    }
}

struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&Request, Response, Next<'_>) -> Result<Response> + Send + Sync,
{
    fn handle(&self, request: &Request, response: Response, next: Next<'_>) -> Result<Response> {
        (self.0)(request, response, next)
    }
}

/// Wrap a closure as a handler
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(&Request, Response) -> Result<Response> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// Wrap a closure as a middleware
pub fn middleware_fn<F>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(&Request, Response, Next<'_>) -> Result<Response> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware(f))
}

/// Rejects requests without a valid forgery token for `action`.
///
/// The token is read from the `X-WP-Nonce` header, falling back to the
/// `_wpnonce` query or form field. Missing and invalid tokens get the same
/// `403` body.
pub struct Nonce {
    action: String,
    verifier: Arc<dyn NonceVerifier>,
}

impl Nonce {
    pub fn new(action: &str, verifier: Arc<dyn NonceVerifier>) -> Self {
        Self { action: action.to_string(), verifier }
    }
}

impl Middleware for Nonce {
    fn handle(&self, request: &Request, response: Response, next: Next<'_>) -> Result<Response> {
        let token = request
            .header("x-wp-nonce")
            .map(str::to_string)
            .or_else(|| request.input("_wpnonce"))
            .filter(|token| !token.is_empty());

        let Some(token) = token else {
            log::debug!("Rejecting {} {}: no nonce", request.method(), request.path());
            return Ok(Response::forbidden(NONCE_FAILURE_MESSAGE));
        };
        if !self.verifier.verify_nonce(&token, &self.action) {
            log::debug!("Rejecting {} {}: invalid nonce", request.method(), request.path());
            return Ok(Response::forbidden(NONCE_FAILURE_MESSAGE));
        }
        next.run(request, response)
    }
}

/// Rejects requests whose user lacks a capability.
pub struct UserCan {
    capability: String,
    user: Arc<dyn CurrentUser>,
}

impl UserCan {
    pub fn new(capability: &str, user: Arc<dyn CurrentUser>) -> Self {
        Self { capability: capability.to_string(), user }
    }
}

impl Middleware for UserCan {
    fn handle(&self, request: &Request, response: Response, next: Next<'_>) -> Result<Response> {
        if !self.user.can(&self.capability) {
            return Ok(Response::forbidden("You do not have permission to access this page."));
        }
        next.run(request, response)
    }
}

/// Builds a middleware from the optional argument of `name:argument`.
pub type MiddlewareFactory = Arc<dyn Fn(Option<&str>) -> Result<Arc<dyn Middleware>> + Send + Sync>;

/// Middleware available to route declarations, by name.
#[derive(Default, Clone)]
pub struct MiddlewareRegistry {
    factories: BTreeMap<String, MiddlewareFactory>,
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(Option<&str>) -> Result<Arc<dyn Middleware>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
    }

    /// Register a middleware that takes no argument.
    pub fn register_instance(&mut self, name: &str, middleware: Arc<dyn Middleware>) {
        self.register(name, move |_| Ok(middleware.clone()));
    }

    /// Resolve `name` or `name:argument`.
    pub fn resolve(&self, spec: &str) -> Result<Arc<dyn Middleware>> {
        let (name, argument) = match spec.split_once(':') {
            Some((name, argument)) => (name, Some(argument)),
            None => (spec, None),
        };
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| HttpError::UnknownMiddleware { name: name.to_string() })?;
        factory(argument)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

/// Handlers available to route declarations, by name (`Controller@method`).
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, handler: Arc<dyn Handler>) {
        self.handlers.insert(name.to_string(), handler);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Handler>> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| HttpError::UnknownHandler { name: name.to_string() }.into())
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}
