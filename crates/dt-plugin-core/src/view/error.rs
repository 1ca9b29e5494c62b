//! # View Errors
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Template '{name}' failed to compile: {message}")]
    Template { name: String, message: String },

    #[error("Template '{name}' failed to render: {message}")]
    Render { name: String, message: String },

    #[error("No view named '{name}'")]
    NotFound { name: String },

    #[error("Failed to read views from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
