//! # Container Errors
//!
//! Errors raised while registering or resolving services.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("No binding registered for service '{type_name}'")]
    NotFound { type_name: &'static str },

    #[error("Binding for '{type_name}' produced a value of an unexpected type")]
    TypeMismatch { type_name: &'static str },

    #[error("Attempted to operate on a poisoned container component: {component}")]
    Poisoned { component: String },
}
