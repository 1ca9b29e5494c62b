//! # Admin Screens
//!
//! The plugin's settings screen inside the host admin area.
pub mod settings;

pub use settings::{page_uri, register_plugin_dependencies, sanitize_text_field, Settings};
