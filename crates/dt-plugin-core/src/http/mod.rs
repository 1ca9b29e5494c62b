//! # HTTP Composition
//!
//! Request and response values, a small router with a middleware chain,
//! route declaration files, the response renderer and the [`Route`]
//! pipeline tying them together. Dispatch is synchronous.
pub mod declarations;
pub mod error;
pub mod middleware;
pub mod pattern;
pub mod renderer;
pub mod request;
pub mod response;
pub mod route;
pub mod router;

pub use declarations::{RouteDeclaration, RouteDeclarations};
pub use error::HttpError;
pub use middleware::{
    handler_fn, middleware_fn, Handler, HandlerRegistry, Middleware, MiddlewareRegistry, Next, Nonce, UserCan,
};
pub use renderer::{Renderer, ResponseRenderer, SharedBuffer};
pub use request::Request;
pub use response::{Content, Response};
pub use route::Route;
pub use router::{RouteEntry, Router, ANY_METHODS};

/// Re-exported so callers need not depend on `http` directly.
pub use ::http::{Method, StatusCode};

#[cfg(test)]
mod tests;
