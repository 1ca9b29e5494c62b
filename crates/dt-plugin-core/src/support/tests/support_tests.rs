use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;

use crate::config::Config;
use crate::config::defaults::plugin_defaults;
use crate::host::{MemoryHost, RewriteRules};
use crate::support::{PluginPaths, UrlGenerator};

fn config() -> Config {
    let mut config = Config::from_value(plugin_defaults()).unwrap();
    config
        .merge(json!({"plugin": {"site_url": "https://example.org/", "url": "https://example.org/wp-content/plugins/dt-plugin/"}}))
        .unwrap();
    config
}

#[test]
fn test_paths_resolve_under_root() {
    let paths = PluginPaths::from_config("/srv/plugin", &config());
    assert_eq!(paths.plugin_path(""), PathBuf::from("/srv/plugin"));
    assert_eq!(paths.plugin_path("/config/"), PathBuf::from("/srv/plugin/config"));
    assert_eq!(paths.views_path("settings/general.hbs"), PathBuf::from("/srv/plugin/resources/views/settings/general.hbs"));
    assert_eq!(paths.routes_path(""), PathBuf::from("/srv/plugin/routes"));
    assert_eq!(paths.src_path("lib.rs"), PathBuf::from("/srv/plugin/src/lib.rs"));
}

#[test]
fn test_route_url_query_form_without_rewrite() {
    let host = Arc::new(MemoryHost::new());
    let urls = UrlGenerator::from_config(&config(), host);

    assert!(!urls.has_route_rewrite());
    assert_eq!(urls.web_url("hello").unwrap(), "https://example.org?dt-plugin=hello");
    assert_eq!(urls.api_url("a/b").unwrap(), "https://example.org?dt-plugin-api=a%2Fb");
}

#[test]
fn test_route_url_path_form_with_rewrite() {
    let host = Arc::new(MemoryHost::new());
    host.add("^dt/plugin/api/(.+)/?", "index.php?dt-plugin-api=$matches[1]");
    let urls = UrlGenerator::from_config(&config(), host);

    assert!(urls.has_route_rewrite());
    assert_eq!(urls.web_url("/hello").unwrap(), "https://example.org/dt/plugin/hello");
    assert_eq!(urls.api_url("hello").unwrap(), "https://example.org/dt/plugin/api/hello");
}

#[test]
fn test_plugin_url_and_unknown_route_file() {
    let urls = UrlGenerator::from_config(&config(), Arc::new(MemoryHost::new()));
    assert_eq!(urls.plugin_url("/resources/app.css"), "https://example.org/wp-content/plugins/dt-plugin/resources/app.css");
    assert!(urls.route_url("x", "admin").is_err());
}
