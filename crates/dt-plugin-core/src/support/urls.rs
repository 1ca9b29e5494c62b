use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use crate::config::{Config, ConfigError};
use crate::host::RewriteRules;
use crate::kernel::error::Result;

/// A public route file: declarations plus how its URLs look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteFile {
    /// Declaration file name under the routes directory
    pub file: String,
    /// Query variable carrying the route path without rewrites
    pub query: String,
    /// URL prefix with rewrites
    pub path: String,
}

/// Builds plugin, route and asset URLs.
#[derive(Clone)]
pub struct UrlGenerator {
    site_url: String,
    plugin_url: String,
    files: BTreeMap<String, RouteFile>,
    rewrite_pattern: Option<String>,
    rewrites: Arc<dyn RewriteRules>,
}

impl std::fmt::Debug for UrlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlGenerator")
            .field("site_url", &self.site_url)
            .field("plugin_url", &self.plugin_url)
            .field("files", &self.files)
            .finish_non_exhaustive()
    }
}

impl UrlGenerator {
    pub fn from_config(config: &Config, rewrites: Arc<dyn RewriteRules>) -> Self {
        let rewrite_pattern = config
            .value("routes.rewrites.0.pattern")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            site_url: config.get_or("plugin.site_url", String::new()).trim_end_matches('/').to_string(),
            plugin_url: config.get_or("plugin.url", String::new()).trim_end_matches('/').to_string(),
            files: config.get_or("routes.files", BTreeMap::new()),
            rewrite_pattern,
            rewrites,
        }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// URL of a file shipped with the plugin.
    pub fn plugin_url(&self, path: &str) -> String {
        format!("{}/{}", self.plugin_url, path.trim_start_matches('/'))
    }

    /// Whether the host has the plugin's first rewrite rule installed.
    pub fn has_route_rewrite(&self) -> bool {
        self.rewrite_pattern
            .as_deref()
            .is_some_and(|pattern| self.rewrites.exists(pattern))
    }

    pub fn route_file(&self, key: &str) -> Result<&RouteFile> {
        self.files
            .get(key)
            .ok_or_else(|| ConfigError::MissingKey { key: format!("routes.files.{}", key) }.into())
    }

    pub fn route_files(&self) -> &BTreeMap<String, RouteFile> {
        &self.files
    }

    /// URL of `path` within route file `key`: the query form
    /// (`{site}?{query}={path}`) unless the rewrite rule is installed, then
    /// the path form (`{site}/{prefix}/{path}`).
    pub fn route_url(&self, path: &str, key: &str) -> Result<String> {
        let file = self.route_file(key)?;
        if self.has_route_rewrite() {
            Ok(format!(
                "{}/{}/{}",
                self.site_url,
                file.path.trim_matches('/'),
                path.trim_start_matches('/')
            ))
        } else {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair(&file.query, path)
                .finish();
            Ok(format!("{}?{}", self.site_url, query))
        }
    }

    pub fn api_url(&self, path: &str) -> Result<String> {
        self.route_url(path, "api")
    }

    pub fn web_url(&self, path: &str) -> Result<String> {
        self.route_url(path, "web")
    }
}
