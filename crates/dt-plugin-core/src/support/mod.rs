//! Filesystem paths and URLs derived from configuration.
pub mod paths;
pub mod urls;

pub use paths::PluginPaths;
pub use urls::{RouteFile, UrlGenerator};

#[cfg(test)]
mod tests;
