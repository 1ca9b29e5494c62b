//! Built-in configuration merged before any declaration file.
use serde_json::{json, Value};

use crate::kernel::constants::{PLUGIN_NAME, PLUGIN_SLUG, TEXT_DOMAIN, VERSION};

/// Minimum host theme version this plugin supports
pub const DT_VERSION: &str = "1.19";

pub fn plugin_defaults() -> Value {
    json!({
        "plugin": {
            "name": PLUGIN_NAME,
            "slug": PLUGIN_SLUG,
            "text_domain": TEXT_DOMAIN,
            "version": VERSION,
            "dt_version": DT_VERSION,
            "site_url": "http://localhost",
            "url": "http://localhost/wp-content/plugins/dt-plugin",
            "paths": {
                "src": "src",
                "resources": "resources",
                "routes": "routes",
                "views": "resources/views",
                "config": "config"
            }
        },
        "routes": {
            "rewrites": [
                { "pattern": "^dt/plugin/api/(.+)/?", "query": "index.php?dt-plugin-api=$matches[1]" },
                { "pattern": "^dt/plugin/(.+)/?", "query": "index.php?dt-plugin=$matches[1]" }
            ],
            "files": {
                "api": { "file": "api.toml", "query": "dt-plugin-api", "path": "dt/plugin/api" },
                "web": { "file": "web.toml", "query": "dt-plugin", "path": "dt/plugin" },
                "magic": { "file": "magic.toml", "query": "dt-plugin-magic", "path": "dt-plugin" }
            },
            "middleware": []
        },
        "options": {
            "prefix": "dt_plugin",
            "defaults": {}
        },
        "templates": {
            "layout": "layouts/template"
        },
        "services": {
            "tgmpa": {
                "plugins": [],
                "config": {}
            }
        }
    })
}
