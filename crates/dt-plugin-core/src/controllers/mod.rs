//! # Controllers
//!
//! Request handlers referenced by route declaration files as
//! `Controller@method`. Each controller is built once from the container
//! and shared by the handlers registered for it.
pub mod api;
pub mod hello;
pub mod magic_link;
pub mod settings;

use std::sync::Arc;

use crate::container::Container;
use crate::http::{handler_fn, HandlerRegistry};
use crate::kernel::error::Result;

pub use api::ApiController;
pub use hello::HelloController;
pub use magic_link::MagicLinkController;
pub use settings::SettingsController;

/// Every handler the plugin's route files may name.
pub fn handlers(container: &Container) -> Result<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();

    let settings = Arc::new(SettingsController::from_container(container)?);
    let show = settings.clone();
    registry.register("SettingsController@show", handler_fn(move |req, res| show.show(req, res)));
    registry.register("SettingsController@update", handler_fn(move |req, res| settings.update(req, res)));

    let magic = Arc::new(MagicLinkController::from_container(container)?);
    let show = magic.clone();
    registry.register("MagicLinkController@show", handler_fn(move |req, res| show.show(req, res)));
    registry.register("MagicLinkController@subpage", handler_fn(move |req, res| magic.subpage(req, res)));

    let api = Arc::new(ApiController::from_container(container)?);
    registry.register("ApiController@hello", handler_fn(move |req, res| api.hello(req, res)));

    let hello = Arc::new(HelloController::from_container(container)?);
    registry.register("HelloController@show", handler_fn(move |req, res| hello.show(req, res)));

    log::debug!("Registered handlers: {}", registry.names().join(", "));
    Ok(registry)
}

#[cfg(test)]
mod tests;
