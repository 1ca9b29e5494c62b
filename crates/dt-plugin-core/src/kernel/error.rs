//! # Kernel Errors
//!
//! Defines the crate-wide error type.
//!
//! [`Error`] wraps the typed error of every subsystem (container, config,
//! hooks, HTTP composition, views, host seams, persistence) through `#[from]`
//! conversions, plus lifecycle failures raised by the composition root.
//! User-facing failures (validation, authorization) are not represented
//! here: they become strings or responses at the point they happen.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::container::error::ContainerError;
use crate::hooks::error::HookError;
use crate::host::error::HostError;
use crate::http::error::HttpError;
use crate::persistence::PersistenceError;
use crate::view::error::ViewError;

/// Crate-wide error type
#[derive(Debug, ThisError)]
pub enum Error {
    /// Service resolution or registration failure
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Configuration loading or lookup failure
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Hook registration or callback failure
    #[error("Hook error: {0}")]
    Hooks(#[from] HookError),

    /// Routing, middleware or rendering failure
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Template registration or rendering failure
    #[error("View error: {0}")]
    View(#[from] ViewError),

    /// A host-platform seam reported a failure
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Data store failure surfaced by a transaction; displays the raw store message
    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    /// Error occurring during a specific lifecycle phase of the composition root.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        provider_name: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the plugin lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Register")]
    Register,
    #[error("Boot")]
    Boot,
    #[error("Init")]
    Init,
    #[error("RunPreCheck")]
    RunPreCheck,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    /// Wrap an error raised by a provider during a lifecycle phase.
    pub fn lifecycle(phase: KernelLifecyclePhase, provider_name: &str, source: Error) -> Self {
        Error::KernelLifecycleError {
            phase,
            provider_name: Some(provider_name.to_string()),
            message: format!("provider '{}' failed", provider_name),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true when the error is a container `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Container(ContainerError::NotFound { .. }))
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
