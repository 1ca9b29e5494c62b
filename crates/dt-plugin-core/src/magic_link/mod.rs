//! # Magic Links
//!
//! Magic links give a record a secret, shareable URL. Apps register
//! themselves through the `dt_magic_url_register_types` filter as
//! `{root: {type: app}}`; a record's key lives in post meta under the app's
//! `meta_key` and is generated on first use.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::hooks::HookBus;
use crate::host::PostMetaStore;
use crate::kernel::constants::MAGIC_URL_TYPES_FILTER;
use crate::kernel::error::Result;

/// A magic-link app registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicApp {
    pub root: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub post_type: String,
    pub meta_key: String,
    #[serde(default)]
    pub label: String,
}

impl MagicApp {
    /// Add this app to a registration map as passed through the filter.
    pub fn register_into(&self, mut apps: Value) -> Result<Value> {
        if !apps.is_object() {
            apps = json!({});
        }
        let entry = serde_json::to_value(self).map_err(|e| format!("Invalid magic app: {}", e))?;
        if let Some(roots) = apps.as_object_mut() {
            let types = roots.entry(self.root.clone()).or_insert_with(|| json!({}));
            if !types.is_object() {
                log::warn!("Replacing non-object magic app registrations under '{}'", self.root);
                *types = json!({});
            }
            if let Some(types) = types.as_object_mut() {
                types.insert(self.kind.clone(), entry);
            }
        }
        Ok(apps)
    }
}

/// Lookup and URL generation for magic-link apps.
#[derive(Clone)]
pub struct MagicLinks {
    hooks: HookBus,
    meta: Arc<dyn PostMetaStore>,
    site_url: String,
}

impl std::fmt::Debug for MagicLinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagicLinks").field("site_url", &self.site_url).finish_non_exhaustive()
    }
}

impl MagicLinks {
    pub fn new(hooks: HookBus, meta: Arc<dyn PostMetaStore>, site_url: &str) -> Self {
        Self {
            hooks,
            meta,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Every registration gathered from the filter.
    pub async fn apps(&self) -> Result<Value> {
        self.hooks.apply_filters(MAGIC_URL_TYPES_FILTER, json!({})).await
    }

    /// The app registered for `root`/`kind`, if any.
    pub async fn app(&self, root: &str, kind: &str) -> Result<Option<MagicApp>> {
        let apps = self.apps().await?;
        Ok(apps
            .get(root)
            .and_then(|types| types.get(kind))
            .and_then(|app| serde_json::from_value(app.clone()).ok()))
    }

    /// Link for record `post_id`, generating its key when it has none.
    /// Unknown apps give an empty string.
    pub async fn url(&self, root: &str, kind: &str, post_id: u64) -> Result<String> {
        let Some(app) = self.app(root, kind).await? else {
            return Ok(String::new());
        };
        let key = match self.meta.get_post_meta(post_id, &app.meta_key) {
            Some(key) => key,
            None => {
                let key = generate_key();
                self.meta.update_post_meta(post_id, &app.meta_key, &key)?;
                key
            }
        };
        Ok(format!("{}/{}/{}/{}", self.site_url, app.root, app.kind, key))
    }

    /// Record owning `key` for the app.
    pub fn record_for_key(&self, app: &MagicApp, key: &str) -> Option<u64> {
        self.meta.find_post_by_meta(&app.meta_key, key)
    }
}

/// A fresh 64-character hexadecimal key.
pub fn generate_key() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}
