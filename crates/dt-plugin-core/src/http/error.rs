//! # HTTP Composition Errors
//!
//! Registration-time and rendering failures. Request-level outcomes (no
//! route, forbidden, invalid input) are responses, not errors.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("No handler registered under '{name}'")]
    UnknownHandler { name: String },

    #[error("No middleware registered under '{name}'")]
    UnknownMiddleware { name: String },

    #[error("Middleware '{name}' requires an argument (use '{name}:<value>')")]
    MissingMiddlewareArgument { name: String },

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid HTTP method '{method}'")]
    InvalidMethod { method: String },

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Invalid route declarations in {path:?}: {reason}")]
    Declarations { path: PathBuf, reason: String },

    #[error("Failed to write response: {0}")]
    Render(#[from] std::io::Error),
}
