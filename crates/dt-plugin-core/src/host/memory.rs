//! In-memory host used by tests and the command-line simulator.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::host::error::HostError;
use crate::host::{
    AdminMenu, AdminNotice, AdminNotices, CurrentUser, DataStore, MenuPage, NonceVerifier, OptionStore,
    PluginDependency, PluginInstaller, PostMetaStore, RewriteRules, ThemeInfo,
};
use crate::kernel::error::Result;

#[derive(Debug, Clone)]
struct UserState {
    id: u64,
    display_name: String,
    capabilities: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct ThemeState {
    name: String,
    version: String,
    disciple_tools: bool,
}

#[derive(Debug, Default)]
struct DataState {
    statements: Vec<String>,
    last_error: Option<String>,
}

/// Host platform kept entirely in memory.
#[derive(Debug)]
pub struct MemoryHost {
    options: Mutex<BTreeMap<String, Value>>,
    rejected_options: Mutex<BTreeSet<String>>,
    nonces: Mutex<BTreeMap<String, String>>,
    user: Mutex<UserState>,
    menu: Mutex<BTreeMap<String, (MenuPage, String)>>,
    notices: Mutex<Vec<AdminNotice>>,
    theme: Mutex<ThemeState>,
    rewrites: Mutex<Vec<(String, String)>>,
    dependencies: Mutex<Option<(Vec<PluginDependency>, Value)>>,
    post_meta: Mutex<BTreeMap<(u64, String), String>>,
    data: Mutex<DataState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// A host running the required theme, with an administrator logged in.
    pub fn new() -> Self {
        let capabilities = ["manage_dt", "manage_options", "read"].iter().map(|c| c.to_string()).collect();
        Self {
            options: Mutex::new(BTreeMap::new()),
            rejected_options: Mutex::new(BTreeSet::new()),
            nonces: Mutex::new(BTreeMap::new()),
            user: Mutex::new(UserState { id: 1, display_name: "admin".to_string(), capabilities }),
            menu: Mutex::new(BTreeMap::new()),
            notices: Mutex::new(Vec::new()),
            theme: Mutex::new(ThemeState {
                name: "Disciple.Tools".to_string(),
                version: "1.60.0".to_string(),
                disciple_tools: true,
            }),
            rewrites: Mutex::new(Vec::new()),
            dependencies: Mutex::new(None),
            post_meta: Mutex::new(BTreeMap::new()),
            data: Mutex::new(DataState::default()),
        }
    }

    pub fn set_theme(&self, name: &str, version: &str, disciple_tools: bool) {
        *lock(&self.theme) = ThemeState {
            name: name.to_string(),
            version: version.to_string(),
            disciple_tools,
        };
    }

    pub fn set_user(&self, id: u64, display_name: &str) {
        let mut user = lock(&self.user);
        user.id = id;
        user.display_name = display_name.to_string();
    }

    pub fn grant(&self, capability: &str) {
        lock(&self.user).capabilities.insert(capability.to_string());
    }

    pub fn revoke(&self, capability: &str) {
        lock(&self.user).capabilities.remove(capability);
    }

    /// Make the data store report an error, as a failed statement would.
    pub fn set_last_error(&self, error: Option<&str>) {
        lock(&self.data).last_error = error.map(str::to_string);
    }

    /// Make every write to option `name` fail, as a read-only store would.
    pub fn reject_option_writes(&self, name: &str) {
        lock(&self.rejected_options).insert(name.to_string());
    }

    fn check_writable(&self, name: &str) -> Result<()> {
        if lock(&self.rejected_options).contains(name) {
            return Err(HostError::OptionWrite { name: name.to_string() }.into());
        }
        Ok(())
    }

    /// Statements executed so far, in order.
    pub fn statements(&self) -> Vec<String> {
        lock(&self.data).statements.clone()
    }

    pub fn registered_dependencies(&self) -> Option<(Vec<PluginDependency>, Value)> {
        lock(&self.dependencies).clone()
    }

    pub fn menu_pages(&self) -> Vec<MenuPage> {
        lock(&self.menu).values().map(|(page, _)| page.clone()).collect()
    }

    pub fn rewrite_rules(&self) -> Vec<(String, String)> {
        lock(&self.rewrites).clone()
    }
}

impl OptionStore for MemoryHost {
    fn get_option(&self, name: &str) -> Option<Value> {
        lock(&self.options).get(name).cloned()
    }

    fn add_option(&self, name: &str, value: Value) -> Result<bool> {
        self.check_writable(name)?;
        let mut options = lock(&self.options);
        if options.contains_key(name) {
            return Ok(false);
        }
        options.insert(name.to_string(), value);
        Ok(true)
    }

    fn update_option(&self, name: &str, value: Value) -> Result<bool> {
        self.check_writable(name)?;
        let mut options = lock(&self.options);
        if options.get(name) == Some(&value) {
            return Ok(false);
        }
        options.insert(name.to_string(), value);
        Ok(true)
    }

    fn delete_option(&self, name: &str) -> Result<bool> {
        Ok(lock(&self.options).remove(name).is_some())
    }
}

impl NonceVerifier for MemoryHost {
    fn create_nonce(&self, action: &str) -> String {
        let nonce = hex::encode(rand::random::<[u8; 5]>());
        lock(&self.nonces).insert(nonce.clone(), action.to_string());
        nonce
    }

    fn verify_nonce(&self, nonce: &str, action: &str) -> bool {
        lock(&self.nonces).get(nonce).is_some_and(|issued_for| issued_for == action)
    }
}

impl CurrentUser for MemoryHost {
    fn id(&self) -> u64 {
        lock(&self.user).id
    }

    fn display_name(&self) -> String {
        lock(&self.user).display_name.clone()
    }

    fn can(&self, capability: &str) -> bool {
        lock(&self.user).capabilities.contains(capability)
    }
}

impl AdminMenu for MemoryHost {
    fn add_submenu_page(&self, page: MenuPage) -> Result<String> {
        let mut menu = lock(&self.menu);
        if menu.contains_key(&page.menu_slug) {
            return Err(HostError::DuplicateMenuPage { slug: page.menu_slug }.into());
        }
        let hook = format!("{}_page_{}", page.parent_slug, page.menu_slug);
        menu.insert(page.menu_slug.clone(), (page, hook.clone()));
        Ok(hook)
    }

    fn page_hook(&self, menu_slug: &str) -> Option<String> {
        lock(&self.menu).get(menu_slug).map(|(_, hook)| hook.clone())
    }
}

impl AdminNotices for MemoryHost {
    fn add_notice(&self, notice: AdminNotice) {
        lock(&self.notices).push(notice);
    }

    fn notices(&self) -> Vec<AdminNotice> {
        lock(&self.notices).clone()
    }
}

impl ThemeInfo for MemoryHost {
    fn name(&self) -> String {
        lock(&self.theme).name.clone()
    }

    fn version(&self) -> String {
        lock(&self.theme).version.clone()
    }

    fn is_disciple_tools(&self) -> bool {
        lock(&self.theme).disciple_tools
    }
}

impl RewriteRules for MemoryHost {
    fn exists(&self, pattern: &str) -> bool {
        lock(&self.rewrites).iter().any(|(p, _)| p == pattern)
    }

    fn add(&self, pattern: &str, query: &str) {
        let mut rewrites = lock(&self.rewrites);
        if !rewrites.iter().any(|(p, _)| p == pattern) {
            rewrites.push((pattern.to_string(), query.to_string()));
        }
    }
}

impl PluginInstaller for MemoryHost {
    fn register(&self, plugins: Vec<PluginDependency>, config: Value) -> Result<()> {
        if let Some(unnamed) = plugins.iter().find(|p| p.slug.is_empty()) {
            return Err(HostError::Installer(format!("plugin '{}' has no slug", unnamed.name)).into());
        }
        *lock(&self.dependencies) = Some((plugins, config));
        Ok(())
    }
}

impl PostMetaStore for MemoryHost {
    fn get_post_meta(&self, post_id: u64, key: &str) -> Option<String> {
        lock(&self.post_meta).get(&(post_id, key.to_string())).cloned()
    }

    fn update_post_meta(&self, post_id: u64, key: &str, value: &str) -> Result<()> {
        lock(&self.post_meta).insert((post_id, key.to_string()), value.to_string());
        Ok(())
    }

    fn find_post_by_meta(&self, key: &str, value: &str) -> Option<u64> {
        lock(&self.post_meta)
            .iter()
            .find(|((_, k), v)| k == key && v.as_str() == value)
            .map(|((id, _), _)| *id)
    }
}

impl DataStore for MemoryHost {
    fn execute(&self, statement: &str) {
        log::debug!("Executing statement: {}", statement);
        lock(&self.data).statements.push(statement.to_string());
    }

    fn last_error(&self) -> Option<String> {
        lock(&self.data).last_error.clone().filter(|e| !e.is_empty())
    }
}
