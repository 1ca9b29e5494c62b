//! # Host Platform Seams
//!
//! The plugin never talks to the host CMS directly. Every host capability it
//! needs (option storage, nonces, the current user, admin menus, notices,
//! theme metadata, rewrite rules, the dependency installer, post meta and
//! the database) is a narrow trait here. [`HostServices`] bundles one
//! implementation of each; [`MemoryHost`] implements all of them in memory.
pub mod error;
pub mod memory;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kernel::error::Result;
pub use error::HostError;
pub use memory::MemoryHost;

/// Persistent key/value option storage.
pub trait OptionStore: Send + Sync {
    fn get_option(&self, name: &str) -> Option<Value>;
    /// Add an option that does not exist yet. Returns false when it exists.
    fn add_option(&self, name: &str, value: Value) -> Result<bool>;
    /// Replace an option value. Returns false when nothing changed.
    fn update_option(&self, name: &str, value: Value) -> Result<bool>;
    fn delete_option(&self, name: &str) -> Result<bool>;
}

/// Request-forgery token issuing and verification.
pub trait NonceVerifier: Send + Sync {
    fn create_nonce(&self, action: &str) -> String;
    fn verify_nonce(&self, nonce: &str, action: &str) -> bool;
}

/// The user making the current request.
pub trait CurrentUser: Send + Sync {
    fn id(&self) -> u64;
    fn display_name(&self) -> String;
    fn can(&self, capability: &str) -> bool;
}

/// Admin submenu registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuPage {
    pub parent_slug: String,
    pub page_title: String,
    pub menu_title: String,
    pub capability: String,
    pub menu_slug: String,
}

pub trait AdminMenu: Send + Sync {
    /// Register a submenu page and return its page hook suffix.
    fn add_submenu_page(&self, page: MenuPage) -> Result<String>;
    fn page_hook(&self, menu_slug: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminNotice {
    pub level: NoticeLevel,
    pub message: String,
    pub dismissible: bool,
}

pub trait AdminNotices: Send + Sync {
    fn add_notice(&self, notice: AdminNotice);
    fn notices(&self) -> Vec<AdminNotice>;
}

/// Metadata of the active host theme.
pub trait ThemeInfo: Send + Sync {
    fn name(&self) -> String;
    fn version(&self) -> String;
    /// Whether the active theme is the one this plugin extends.
    fn is_disciple_tools(&self) -> bool;
}

pub trait RewriteRules: Send + Sync {
    fn exists(&self, pattern: &str) -> bool;
    fn add(&self, pattern: &str, query: &str);
}

/// One entry of the third-party plugin dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDependency {
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub required: bool,
}

pub trait PluginInstaller: Send + Sync {
    fn register(&self, plugins: Vec<PluginDependency>, config: Value) -> Result<()>;
}

/// Per-record metadata storage.
pub trait PostMetaStore: Send + Sync {
    fn get_post_meta(&self, post_id: u64, key: &str) -> Option<String>;
    fn update_post_meta(&self, post_id: u64, key: &str, value: &str) -> Result<()>;
    /// Find the record carrying `key` = `value`.
    fn find_post_by_meta(&self, key: &str, value: &str) -> Option<u64>;
}

/// Raw statement execution with the host's sticky last-error.
pub trait DataStore: Send + Sync {
    fn execute(&self, statement: &str);
    /// Last error reported by the store, empty when none.
    fn last_error(&self) -> Option<String>;
}

/// One implementation of every host seam.
#[derive(Clone)]
pub struct HostServices {
    pub options: Arc<dyn OptionStore>,
    pub nonces: Arc<dyn NonceVerifier>,
    pub user: Arc<dyn CurrentUser>,
    pub menu: Arc<dyn AdminMenu>,
    pub notices: Arc<dyn AdminNotices>,
    pub theme: Arc<dyn ThemeInfo>,
    pub rewrites: Arc<dyn RewriteRules>,
    pub installer: Arc<dyn PluginInstaller>,
    pub post_meta: Arc<dyn PostMetaStore>,
    pub data: Arc<dyn DataStore>,
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}

impl HostServices {
    /// Every seam backed by the same in-memory host.
    pub fn memory(host: Arc<MemoryHost>) -> Self {
        Self {
            options: host.clone(),
            nonces: host.clone(),
            user: host.clone(),
            menu: host.clone(),
            notices: host.clone(),
            theme: host.clone(),
            rewrites: host.clone(),
            installer: host.clone(),
            post_meta: host.clone(),
            data: host,
        }
    }
}
