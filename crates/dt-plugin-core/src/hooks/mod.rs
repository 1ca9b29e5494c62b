//! # Host Hook Bus
//!
//! In-process model of the host platform's hook system: named **actions**
//! (fire-and-continue callbacks) and **filters** (callbacks that transform a
//! value and hand it to the next one). Callbacks run in ascending priority,
//! registration order within one priority.
//!
//! Callbacks are async; [`sync_action`] and [`sync_filter`] adapt plain
//! closures. Callbacks may add or remove hooks while a hook is running: the
//! bus releases its lock before invoking them.
pub mod dispatcher;
pub mod error;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::kernel::error::Result;

pub use dispatcher::{HookBus, HookRegistry};
pub use error::HookError;

/// Type for hook callback identifiers
pub type HookId = u64;

/// Priority used when none is given
pub const DEFAULT_PRIORITY: i32 = 10;

/// Owned future returned by hook callbacks
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Callback attached to an action; receives the action arguments
pub type ActionCallback = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Callback attached to a filter; receives and returns the filtered value
pub type FilterCallback = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Kind of hook a callback is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Action,
    Filter,
}

/// Wrap an async closure as an action callback
pub fn action<F, Fut>(f: F) -> ActionCallback
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |args: Value| -> BoxFuture<'static, Result<()>> { Box::pin(f(args)) })
}

/// Wrap an async closure as a filter callback
pub fn filter<F, Fut>(f: F) -> FilterCallback
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(move |value: Value| -> BoxFuture<'static, Result<Value>> { Box::pin(f(value)) })
}

/// Helper function to create synchronous action callbacks
pub fn sync_action<F>(f: F) -> ActionCallback
where
    F: Fn(Value) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(move |args: Value| -> BoxFuture<'static, Result<()>> {
        let result = f(args);
        Box::pin(async move { result })
    })
}

/// Helper function to create synchronous filter callbacks
pub fn sync_filter<F>(f: F) -> FilterCallback
where
    F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
{
    Arc::new(move |value: Value| -> BoxFuture<'static, Result<Value>> {
        let result = f(value);
        Box::pin(async move { result })
    })
}
