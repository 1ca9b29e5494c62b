//! # Views
//!
//! Handlebars-backed view engine and the layout-wrapping template service.
pub mod engine;
pub mod error;
pub mod template;

pub use engine::ViewEngine;
pub use error::ViewError;
pub use template::Template;

#[cfg(test)]
mod tests;
