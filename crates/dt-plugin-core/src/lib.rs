//! # dt-plugin-core
//!
//! Composition core of the DT plugin starter. The crate wires a typed service
//! container, a configuration store, a host hook bus, an HTTP-shaped router
//! with a middleware chain, a response renderer and a view engine into the
//! host platform's plugin lifecycle.
//!
//! The host platform itself (option storage, nonces, admin menus, rewrite
//! rules, post meta, the database) is reached through the traits in [`host`];
//! [`host::MemoryHost`] implements all of them in memory.
pub mod admin;
pub mod config;
pub mod container;
pub mod controllers;
pub mod helpers;
pub mod hooks;
pub mod host;
pub mod http;
pub mod kernel;
pub mod magic_link;
pub mod options;
pub mod persistence;
pub mod plugin;
pub mod providers;
pub mod support;
pub mod utils;
pub mod validation;
pub mod view;

// Re-export key public types for the binary and for embedding hosts
pub use config::Config;
pub use container::{Container, Registrar};
pub use hooks::HookBus;
pub use host::{HostServices, MemoryHost};
pub use crate::http::{Request, Response, Route, Router};
pub use kernel::Application;
pub use kernel::error::{Error, Result};
pub use providers::{Boot, BootContext, Register};

#[cfg(test)]
mod tests;
