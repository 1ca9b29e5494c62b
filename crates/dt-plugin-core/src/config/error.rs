//! # Configuration Errors
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} configuration{}: {message}", .path.as_ref().map(|p| format!(" {:?}", p)).unwrap_or_default())]
    Parse {
        format: &'static str,
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Unsupported configuration format for {path:?}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Missing configuration key '{key}'")]
    MissingKey { key: String },

    #[error("Configuration key '{key}' has an unexpected type: {message}")]
    Type { key: String, message: String },

    #[error("Configuration root must be a mapping, found {found}")]
    NotAnObject { found: &'static str },
}
