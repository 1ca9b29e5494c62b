//! # Plugin Options
//!
//! Plugin-scoped access to the host option store. Keys are prefixed with
//! the plugin's option prefix (`greeting` is stored as `dt_plugin_greeting`)
//! and fall back to the defaults declared under `options.defaults`.
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::Config;
use crate::host::OptionStore;
use crate::kernel::error::Result;

#[derive(Clone)]
pub struct Options {
    store: Arc<dyn OptionStore>,
    prefix: String,
    defaults: Map<String, Value>,
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("prefix", &self.prefix)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Options {
    pub fn new(store: Arc<dyn OptionStore>, prefix: &str, defaults: Map<String, Value>) -> Self {
        Self { store, prefix: prefix.to_string(), defaults }
    }

    pub fn from_config(store: Arc<dyn OptionStore>, config: &Config) -> Self {
        let prefix = config.get_or("options.prefix", "dt_plugin".to_string());
        let defaults = config.get_or("options.defaults", Map::new());
        Self::new(store, &prefix, defaults)
    }

    /// Host option name for a plugin option key.
    pub fn scope_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}_{}", self.prefix, key)
        }
    }

    /// Configured default for `key`, if any.
    pub fn default_value(&self, key: &str) -> Option<&Value> {
        self.defaults.get(key)
    }

    /// Stored value, else `default`, else the configured default.
    ///
    /// With `required`, a value that had to fall back to a default is
    /// persisted so later reads find it stored.
    pub fn get(&self, key: &str, default: Option<Value>, required: bool) -> Result<Option<Value>> {
        let name = self.scope_key(key);
        if let Some(stored) = self.store.get_option(&name) {
            return Ok(Some(stored));
        }
        let fallback = default.or_else(|| self.default_value(key).cloned());
        if required {
            if let Some(value) = &fallback {
                log::debug!("Persisting default for required option {}", name);
                self.store.add_option(&name, value.clone())?;
            }
        }
        Ok(fallback)
    }

    /// Store a value: added when absent, updated otherwise.
    pub fn set(&self, key: &str, value: Value) -> Result<bool> {
        set_option(self.store.as_ref(), &self.scope_key(key), value)
    }

    pub fn delete(&self, key: &str) -> Result<bool> {
        self.store.delete_option(&self.scope_key(key))
    }
}

/// Add `name` when absent, update it otherwise.
pub fn set_option(store: &dyn OptionStore, name: &str, value: Value) -> Result<bool> {
    if store.get_option(name).is_none() {
        store.add_option(name, value)
    } else {
        store.update_option(name, value)
    }
}
