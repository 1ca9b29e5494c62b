use std::path::{Path, PathBuf};

use crate::config::Config;

/// Plugin directories, relative ones resolved against the plugin root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginPaths {
    root: PathBuf,
    src: String,
    resources: String,
    routes: String,
    views: String,
    config: String,
}

impl PluginPaths {
    /// Directory layout from `plugin.paths.*`, with the stock layout as
    /// fallback.
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        let dir = |key: &str, default: &str| config.get_or(&format!("plugin.paths.{}", key), default.to_string());
        Self {
            root: root.into(),
            src: dir("src", "src"),
            resources: dir("resources", "resources"),
            routes: dir("routes", "routes"),
            views: dir("views", "resources/views"),
            config: dir("config", "config"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `path` under the plugin root.
    pub fn plugin_path(&self, path: &str) -> PathBuf {
        let path = path.trim_matches('/');
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    pub fn src_path(&self, path: &str) -> PathBuf {
        self.nested(&self.src, path)
    }

    pub fn resources_path(&self, path: &str) -> PathBuf {
        self.nested(&self.resources, path)
    }

    pub fn routes_path(&self, path: &str) -> PathBuf {
        self.nested(&self.routes, path)
    }

    pub fn views_path(&self, path: &str) -> PathBuf {
        self.nested(&self.views, path)
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.nested(&self.config, path)
    }

    fn nested(&self, dir: &str, path: &str) -> PathBuf {
        self.plugin_path(&format!("{}/{}", dir.trim_matches('/'), path.trim_start_matches('/')))
    }
}
