use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::Config;
use crate::container::Container;
use crate::helpers::namespace_string;
use crate::hooks::{action, sync_filter, HookBus, DEFAULT_PRIORITY};
use crate::host::{AdminMenu, MenuPage, PluginDependency, PluginInstaller};
use crate::http::{Request, Route};
use crate::kernel::constants::{ADMIN_MENU_ACTION, PLUGIN_NAME, PLUGIN_SLUG};
use crate::kernel::error::Result;

/// Priority of the `admin_menu` callback; late so the parent menu exists
pub const ADMIN_MENU_PRIORITY: i32 = 99;
/// Parent menu of the settings page
pub const PARENT_MENU_SLUG: &str = "dt_extensions";
/// Capability required to open the settings page
pub const SETTINGS_CAPABILITY: &str = "manage_dt";
/// Route declarations of the settings screen
pub const SETTINGS_ROUTE_FILE: &str = "settings.toml";

/// The settings screen: admin menu entry, tab list and the sub-request
/// that renders the selected tab.
#[derive(Debug, Clone)]
pub struct Settings {
    container: Arc<Container>,
    hooks: HookBus,
}

impl Settings {
    pub fn new(container: Arc<Container>, hooks: HookBus) -> Self {
        Self { container, hooks }
    }

    /// Hook `admin_menu`.
    pub async fn init(self: &Arc<Self>) -> Result<()> {
        let settings = Arc::clone(self);
        self.hooks
            .add_action(
                ADMIN_MENU_ACTION,
                ADMIN_MENU_PRIORITY,
                action(move |_| {
                    let settings = settings.clone();
                    async move { settings.register_menu().await.map(|_| ()) }
                }),
            )
            .await?;
        Ok(())
    }

    /// Add the submenu page, contribute the "General" tab and hook the
    /// page's `load-{hook}` action. Returns the page hook.
    pub async fn register_menu(self: Arc<Self>) -> Result<String> {
        let menu = self.container.get::<dyn AdminMenu>()?;
        let hook = menu.add_submenu_page(MenuPage {
            parent_slug: PARENT_MENU_SLUG.to_string(),
            page_title: PLUGIN_NAME.to_string(),
            menu_title: PLUGIN_NAME.to_string(),
            capability: SETTINGS_CAPABILITY.to_string(),
            menu_slug: PLUGIN_SLUG.to_string(),
        })?;

        self.hooks
            .add_filter(
                &namespace_string("settings_tabs"),
                DEFAULT_PRIORITY,
                sync_filter(|tabs| {
                    let mut tabs = match tabs {
                        Value::Array(tabs) => tabs,
                        _ => Vec::new(),
                    };
                    tabs.push(json!({ "label": "General", "tab": "general" }));
                    Ok(Value::Array(tabs))
                }),
            )
            .await?;

        let settings = self.clone();
        self.hooks
            .add_action(
                &format!("load-{}", hook),
                DEFAULT_PRIORITY,
                action(move |_| {
                    let settings = settings.clone();
                    async move { settings.load().await }
                }),
            )
            .await?;
        log::debug!("Registered settings page {}", hook);
        Ok(hook)
    }

    /// Tabs contributed through the namespaced `settings_tabs` filter.
    pub async fn tabs(&self) -> Result<Value> {
        self.hooks.apply_filters(&namespace_string("settings_tabs"), json!([])).await
    }

    /// Render the selected tab: the current request re-aimed at
    /// `/wp-admin/{page}/{tab}` and dispatched through the settings routes.
    pub async fn load(&self) -> Result<()> {
        let tabs = self.tabs().await?;
        let current = self.container.get::<Request>()?;
        let uri = page_uri(
            current.query_param("page").unwrap_or_default(),
            current.query_param("tab").unwrap_or_default(),
        );
        let request = Request::clone(&current).with_path(&uri).with_attribute("tabs", tabs);
        Route::from_container(&self.container)?
            .with_request(request)
            .from_route_file(SETTINGS_ROUTE_FILE)?
            .render()
    }
}

/// Admin sub-request path for a page and tab.
pub fn page_uri(page: &str, tab: &str) -> String {
    let relative = format!("{}/{}", sanitize_text_field(page), sanitize_text_field(tab));
    format!("/wp-admin/{}", relative.trim_matches('/'))
}

/// Plain single-line text: tags and control characters removed, whitespace
/// collapsed.
pub fn sanitize_text_field(value: &str) -> String {
    let mut text = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_control() => text.push(' '),
            c => text.push(c),
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Hand the third-party plugin manifest (`services.tgmpa`) to the host
/// installer.
pub fn register_plugin_dependencies(container: &Container) -> Result<()> {
    let config = container.get::<Config>()?;
    let plugins: Vec<PluginDependency> = config.require("services.tgmpa.plugins")?;
    let installer_config = config.value("services.tgmpa.config").cloned().unwrap_or_else(|| json!({}));
    log::debug!("Registering {} plugin dependencies", plugins.len());
    container.get::<dyn PluginInstaller>()?.register(plugins, installer_config)
}
