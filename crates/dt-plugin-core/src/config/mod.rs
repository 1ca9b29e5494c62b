//! # Configuration Store
//!
//! Hierarchical plugin configuration addressed by dotted keys
//! (`plugin.paths.views`). Built by successive [`Config::merge`] calls:
//! defaults first, then every declaration file under `config/`. Once built
//! it is handed out as `Arc<Config>` and never mutated again.
pub mod defaults;
pub mod error;
pub mod loader;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kernel::error::Result;
pub use error::ConfigError;
pub use loader::{ConfigFormat, ConfigLoader};

/// In-memory configuration tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    root: Map<String, Value>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from a mapping value.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut config = Self::new();
        config.merge(value)?;
        Ok(config)
    }

    /// Deep-merge a mapping into the configuration.
    ///
    /// Mappings merge key by key; any other value (arrays included) replaces
    /// what was there. Top-level keys containing dots are expanded, so
    /// `{"plugin.name": "x"}` lands at `plugin` → `name`.
    pub fn merge(&mut self, value: Value) -> Result<()> {
        let Value::Object(incoming) = value else {
            return Err(ConfigError::NotAnObject { found: type_name(&value) }.into());
        };
        for (key, value) in incoming {
            let expanded = expand_dotted(&key, value);
            let Value::Object(single) = expanded else { continue };
            for (head, value) in single {
                match self.root.get_mut(&head) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        self.root.insert(head, value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Raw value at a dotted key.
    pub fn value(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = self.root.get(first)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Get a configuration value, `None` when absent or of another shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.value(key).and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get a configuration value, failing when it is absent or mistyped.
    pub fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .value(key)
            .ok_or_else(|| ConfigError::MissingKey { key: key.to_string() })?;
        serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::Type { key: key.to_string(), message: e.to_string() }.into())
    }

    /// Set a value at a dotted key, creating intermediate mappings.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| ConfigError::Type { key: key.to_string(), message: e.to_string() })?;
        let mut parts: Vec<&str> = key.split('.').collect();
        let leaf = parts.pop().unwrap_or(key);
        let mut current = &mut self.root;
        for part in parts {
            let entry = current.entry(part.to_string()).or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry.as_object_mut() {
                Some(map) => map,
                None => return Err(ConfigError::NotAnObject { found: "scalar" }.into()),
            };
        }
        current.insert(leaf.to_string(), value);
        Ok(())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Whole tree as a JSON value.
    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }
}

fn expand_dotted(key: &str, value: Value) -> Value {
    key.rsplit('.').fold(value, |inner, part| {
        let mut map = Map::new();
        map.insert(part.to_string(), inner);
        Value::Object(map)
    })
}

fn merge_values(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests;
