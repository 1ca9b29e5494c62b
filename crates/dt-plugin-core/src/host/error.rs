//! # Host Errors
use thiserror::Error;

/// Failures reported by a host-platform seam.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Host option '{name}' could not be stored")]
    OptionWrite { name: String },

    #[error("Admin menu page '{slug}' is already registered")]
    DuplicateMenuPage { slug: String },

    #[error("Host state is unavailable: {0}")]
    Unavailable(String),

    #[error("Plugin dependency manifest rejected: {0}")]
    Installer(String),
}
