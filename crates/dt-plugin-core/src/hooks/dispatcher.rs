use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::hooks::error::HookError;
use crate::hooks::{ActionCallback, FilterCallback, HookId, HookKind};
use crate::kernel::error::Result;

struct Entry<C> {
    id: HookId,
    priority: i32,
    callback: C,
}

//--------------------------------------------------
// HookRegistry (Internal, wrapped by HookBus)
//--------------------------------------------------

/// Registered callbacks, kept sorted by priority then registration order
pub struct HookRegistry {
    actions: HashMap<String, Vec<Entry<ActionCallback>>>,
    filters: HashMap<String, Vec<Entry<FilterCallback>>>,
    fired: HashMap<String, usize>,
    next_id: HookId,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action_count: usize = self.actions.values().map(|v| v.len()).sum();
        let filter_count: usize = self.filters.values().map(|v| v.len()).sum();
        f.debug_struct("HookRegistry")
            .field("actions_count", &action_count)
            .field("filters_count", &filter_count)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            filters: HashMap::new(),
            fired: HashMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> HookId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_action(&mut self, name: &str, priority: i32, callback: ActionCallback) -> Result<HookId> {
        if name.is_empty() {
            return Err(HookError::EmptyName { kind: HookKind::Action }.into());
        }
        let id = self.allocate_id();
        insert_sorted(self.actions.entry(name.to_string()).or_default(), Entry { id, priority, callback });
        Ok(id)
    }

    pub fn add_filter(&mut self, name: &str, priority: i32, callback: FilterCallback) -> Result<HookId> {
        if name.is_empty() {
            return Err(HookError::EmptyName { kind: HookKind::Filter }.into());
        }
        let id = self.allocate_id();
        insert_sorted(self.filters.entry(name.to_string()).or_default(), Entry { id, priority, callback });
        Ok(id)
    }

    pub fn remove(&mut self, id: HookId) -> bool {
        let mut found = false;
        for entries in self.actions.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.id != id);
            found |= entries.len() < before;
        }
        for entries in self.filters.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.id != id);
            found |= entries.len() < before;
        }
        found
    }

    fn action_snapshot(&self, name: &str) -> Vec<(HookId, ActionCallback)> {
        self.actions
            .get(name)
            .map(|entries| entries.iter().map(|e| (e.id, e.callback.clone())).collect())
            .unwrap_or_default()
    }

    fn filter_snapshot(&self, name: &str) -> Vec<(HookId, FilterCallback)> {
        self.filters
            .get(name)
            .map(|entries| entries.iter().map(|e| (e.id, e.callback.clone())).collect())
            .unwrap_or_default()
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.get(name).is_some_and(|e| !e.is_empty())
    }

    pub fn has_filter(&self, name: &str) -> bool {
        self.filters.get(name).is_some_and(|e| !e.is_empty())
    }
}

// Equal priorities keep registration order.
fn insert_sorted<C>(entries: &mut Vec<Entry<C>>, entry: Entry<C>) {
    let index = entries.partition_point(|e| e.priority <= entry.priority);
    entries.insert(index, entry);
}

//--------------------------------------------------
// HookBus (Public API)
//--------------------------------------------------

/// Thread-safe shared hook bus using Tokio Mutex
#[derive(Clone, Default)]
pub struct HookBus {
    registry: Arc<Mutex<HookRegistry>>,
}

impl fmt::Debug for HookBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookBus").finish_non_exhaustive()
    }
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_action(&self, name: &str, priority: i32, callback: ActionCallback) -> Result<HookId> {
        let mut registry = self.registry.lock().await;
        let id = registry.add_action(name, priority, callback)?;
        log::debug!("Added action '{}' (id {}, priority {})", name, id, priority);
        Ok(id)
    }

    pub async fn add_filter(&self, name: &str, priority: i32, callback: FilterCallback) -> Result<HookId> {
        let mut registry = self.registry.lock().await;
        let id = registry.add_filter(name, priority, callback)?;
        log::debug!("Added filter '{}' (id {}, priority {})", name, id, priority);
        Ok(id)
    }

    /// Remove a callback by the id returned at registration.
    pub async fn remove(&self, id: HookId) -> bool {
        self.registry.lock().await.remove(id)
    }

    /// Fire an action. Returns the number of callbacks invoked.
    ///
    /// The first failing callback stops the action and its error is returned.
    pub async fn do_action(&self, name: &str, args: Value) -> Result<usize> {
        let callbacks = {
            let mut registry = self.registry.lock().await;
            *registry.fired.entry(name.to_string()).or_insert(0) += 1;
            registry.action_snapshot(name)
        };
        log::debug!("Firing action '{}' ({} callbacks)", name, callbacks.len());
        let count = callbacks.len();
        for (id, callback) in callbacks {
            callback(args.clone()).await.map_err(|e| HookError::CallbackFailed {
                hook: name.to_string(),
                kind: HookKind::Action,
                id,
                source: Box::new(e),
            })?;
        }
        Ok(count)
    }

    /// Pass `value` through every filter callback and return the result.
    pub async fn apply_filters(&self, name: &str, value: Value) -> Result<Value> {
        let callbacks = self.registry.lock().await.filter_snapshot(name);
        let mut value = value;
        for (id, callback) in callbacks {
            value = callback(value).await.map_err(|e| HookError::CallbackFailed {
                hook: name.to_string(),
                kind: HookKind::Filter,
                id,
                source: Box::new(e),
            })?;
        }
        Ok(value)
    }

    pub async fn has_action(&self, name: &str) -> bool {
        self.registry.lock().await.has_action(name)
    }

    pub async fn has_filter(&self, name: &str) -> bool {
        self.registry.lock().await.has_filter(name)
    }

    /// How many times an action has been fired.
    pub async fn did_action(&self, name: &str) -> usize {
        self.registry.lock().await.fired.get(name).copied().unwrap_or(0)
    }
}
