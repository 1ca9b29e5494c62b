//! # Plugin Entry
//!
//! The object the host sees as "the plugin": it checks the host theme once
//! the host has loaded and announces the plugin to the theme's plugin list.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use semver::Version;
use serde_json::{json, Value};

use crate::config::Config;
use crate::container::Container;
use crate::hooks::{action, sync_action, sync_filter, HookBus, DEFAULT_PRIORITY};
use crate::host::{AdminNotice, AdminNotices, NoticeLevel, ThemeInfo};
use crate::kernel::constants::{ADMIN_NOTICES_ACTION, DT_PLUGINS_FILTER, PLUGIN_SLUG, WP_LOADED_ACTION};
use crate::kernel::error::Result;
use crate::support::UrlGenerator;

/// Priority of the `wp_loaded` callback
pub const WP_LOADED_PRIORITY: i32 = 20;

pub struct Plugin {
    config: Arc<Config>,
    hooks: HookBus,
    theme: Arc<dyn ThemeInfo>,
    notices: Arc<dyn AdminNotices>,
    urls: Arc<UrlGenerator>,
    ready: AtomicBool,
    /// Set once the theme notice is hooked into `admin_notices`
    notice_queued: AtomicBool,
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name())
            .field("version", &self.version())
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl Plugin {
    pub fn new(
        config: Arc<Config>,
        hooks: HookBus,
        theme: Arc<dyn ThemeInfo>,
        notices: Arc<dyn AdminNotices>,
        urls: Arc<UrlGenerator>,
    ) -> Self {
        Self {
            config,
            hooks,
            theme,
            notices,
            urls,
            ready: AtomicBool::new(false),
            notice_queued: AtomicBool::new(false),
        }
    }

    pub fn from_container(container: &Container) -> Result<Self> {
        Ok(Self::new(
            container.get::<Config>()?,
            HookBus::clone(&*container.get::<HookBus>()?),
            container.get::<dyn ThemeInfo>()?,
            container.get::<dyn AdminNotices>()?,
            container.get::<UrlGenerator>()?,
        ))
    }

    pub fn name(&self) -> String {
        self.config.get_or("plugin.name", String::new())
    }

    pub fn version(&self) -> String {
        self.config.get_or("plugin.version", String::new())
    }

    /// Minimum theme version, `plugin.dt_version`.
    pub fn required_dt_version(&self) -> String {
        self.config.get_or("plugin.dt_version", String::new())
    }

    /// Whether `wp_loaded` found a supported theme.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Hook `wp_loaded` and `dt_plugins`.
    pub async fn init(self: &Arc<Self>) -> Result<()> {
        let plugin = Arc::clone(self);
        self.hooks
            .add_action(
                WP_LOADED_ACTION,
                WP_LOADED_PRIORITY,
                action(move |_| {
                    let plugin = plugin.clone();
                    async move { plugin.wp_loaded().await }
                }),
            )
            .await?;

        let plugin = Arc::clone(self);
        self.hooks
            .add_filter(DT_PLUGINS_FILTER, DEFAULT_PRIORITY, sync_filter(move |plugins| Ok(plugin.dt_plugins(plugins))))
            .await?;
        log::info!("{} {} initialised", self.name(), self.version());
        Ok(())
    }

    /// Mark the plugin ready, or queue an admin notice when the theme is
    /// missing or too old.
    pub async fn wp_loaded(&self) -> Result<()> {
        if !self.is_dt_version() {
            log::warn!(
                "Theme {} {} does not satisfy Disciple.Tools >= {}",
                self.theme.name(),
                self.theme.version(),
                self.required_dt_version()
            );
            if self.notice_queued.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
            let notices = self.notices.clone();
            let message = self.theme_notice();
            self.hooks
                .add_action(
                    ADMIN_NOTICES_ACTION,
                    DEFAULT_PRIORITY,
                    sync_action(move |_| {
                        notices.add_notice(AdminNotice {
                            level: NoticeLevel::Error,
                            message: message.clone(),
                            dismissible: true,
                        });
                        Ok(())
                    }),
                )
                .await?;
            return Ok(());
        }
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Whether the active theme is Disciple.Tools at the required version
    /// or later.
    pub fn is_dt_version(&self) -> bool {
        if !self.theme.is_disciple_tools() {
            return false;
        }
        match (lenient_version(&self.theme.version()), lenient_version(&self.required_dt_version())) {
            (Some(installed), Some(required)) => installed >= required,
            _ => false,
        }
    }

    fn theme_notice(&self) -> String {
        format!(
            "'{}' plugin requires 'Disciple.Tools' theme to work. Please activate 'Disciple.Tools' theme or make sure it is version {} or later.",
            self.name(),
            self.required_dt_version()
        )
    }

    /// Add this plugin's entry to the theme's plugin list.
    pub fn dt_plugins(&self, plugins: Value) -> Value {
        let mut plugins = match plugins {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        plugins.insert(
            PLUGIN_SLUG.to_string(),
            json!({
                "plugin_url": self.urls.plugin_url(""),
                "version": self.version(),
                "name": self.name(),
            }),
        );
        Value::Object(plugins)
    }
}

/// Parse `1`, `1.2` or `1.2.3` (suffixes like `-beta` ignored) as a
/// version, padding missing parts with zero.
pub fn lenient_version(raw: &str) -> Option<Version> {
    let mut parts = [0u64; 3];
    let mut seen = 0;
    for (slot, part) in parts.iter_mut().zip(raw.trim().trim_start_matches('v').split('.')) {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            break;
        }
        *slot = digits.parse().ok()?;
        seen += 1;
        if digits.len() != part.len() {
            break;
        }
    }
    (seen > 0).then(|| Version::new(parts[0], parts[1], parts[2]))
}
