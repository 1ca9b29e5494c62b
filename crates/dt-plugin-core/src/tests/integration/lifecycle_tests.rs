#![cfg(test)]

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::tempdir;

use crate::config::Config;
use crate::host::{AdminNotices, MemoryHost, NoticeLevel, OptionStore};
use crate::http::{Renderer, Request};
use crate::kernel::constants::{ADMIN_NOTICES_ACTION, DT_PLUGINS_FILTER, INIT_ACTION, WP_LOADED_ACTION};
use crate::kernel::error::{Error, KernelLifecyclePhase};
use crate::options::Options;
use crate::tests::integration::common::{boot, boot_with, plugin_root};
use crate::view::{Template, ViewEngine};
use crate::validation::SchemaValidator;

#[tokio::test]
async fn test_boot_loads_configuration_files_over_defaults() {
    let test = boot(Request::get("/")).await;
    let config = test.app.container().get::<Config>().unwrap();

    assert_eq!(config.get::<String>("plugin.slug").as_deref(), Some("dt-plugin"));
    assert_eq!(
        config.get::<String>("options.defaults.greeting").as_deref(),
        Some("Hello from DT Plugin")
    );
    assert_eq!(config.get::<String>("services.tgmpa.config.id").as_deref(), Some("disciple_tools"));
}

#[tokio::test]
async fn test_boot_twice_is_rejected() {
    let mut test = boot(Request::get("/")).await;
    let err = test.app.boot().await.unwrap_err();

    assert!(matches!(
        err,
        Error::KernelLifecycleError { phase: KernelLifecyclePhase::RunPreCheck, .. }
    ));
    assert!(test.app.is_booted());
}

#[tokio::test]
async fn test_services_are_bound_with_expected_lifetimes() {
    let test = boot(Request::get("/")).await;
    let container = test.app.container();

    assert!(Arc::ptr_eq(&container.get::<Options>().unwrap(), &container.get::<Options>().unwrap()));
    assert!(Arc::ptr_eq(&container.get::<Template>().unwrap(), &container.get::<Template>().unwrap()));
    assert!(!Arc::ptr_eq(
        &container.get::<SchemaValidator>().unwrap(),
        &container.get::<SchemaValidator>().unwrap()
    ));
    assert!(container.get::<ViewEngine>().unwrap().has("settings/general"));
    assert_eq!(container.get::<Request>().unwrap().path(), "/");
    assert!(container.has::<dyn Renderer>());
}

#[tokio::test]
async fn test_boot_registers_plugin_dependencies() {
    let test = boot(Request::get("/")).await;
    let (plugins, config) = test.host.registered_dependencies().unwrap();

    let slugs: Vec<&str> = plugins.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["disciple-tools-dashboard", "disciple-tools-genmapper", "disciple-tools-autolink"]);
    assert!(!plugins[0].required);
    assert!(plugins[1].required);
    assert_eq!(config["parent_slug"], json!("plugins.php"));
}

#[tokio::test]
async fn test_wp_loaded_marks_plugin_ready_on_supported_theme() {
    let test = boot(Request::get("/")).await;
    let plugin = test.app.plugin().unwrap();
    assert!(!plugin.is_ready());

    test.fire(WP_LOADED_ACTION).await;
    test.fire(ADMIN_NOTICES_ACTION).await;

    assert!(plugin.is_ready());
    assert!(test.host.notices().is_empty());
}

#[tokio::test]
async fn test_outdated_theme_queues_admin_notice() {
    let host = Arc::new(MemoryHost::new());
    host.set_theme("Disciple.Tools", "1.2.0", true);
    let test = boot_with(&plugin_root(), host, Request::get("/")).await;

    test.fire(WP_LOADED_ACTION).await;
    assert!(test.host.notices().is_empty());
    test.fire(ADMIN_NOTICES_ACTION).await;

    let notices = test.host.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("Disciple.Tools"));
    assert!(!test.app.plugin().unwrap().is_ready());
}

#[tokio::test]
async fn test_repeated_wp_loaded_queues_one_notice() {
    let host = Arc::new(MemoryHost::new());
    host.set_theme("Disciple.Tools", "1.2.0", true);
    let test = boot_with(&plugin_root(), host, Request::get("/")).await;

    test.fire(WP_LOADED_ACTION).await;
    test.fire(WP_LOADED_ACTION).await;
    test.fire(WP_LOADED_ACTION).await;
    test.fire(ADMIN_NOTICES_ACTION).await;

    assert_eq!(test.host.notices().len(), 1);
}

#[tokio::test]
async fn test_other_theme_is_not_supported() {
    let host = Arc::new(MemoryHost::new());
    host.set_theme("Twenty Twenty-Four", "9.9", false);
    let test = boot_with(&plugin_root(), host, Request::get("/")).await;

    test.fire(WP_LOADED_ACTION).await;

    assert!(!test.app.plugin().unwrap().is_dt_version());
    assert!(!test.app.plugin().unwrap().is_ready());
}

#[tokio::test]
async fn test_dt_plugins_filter_adds_entry_and_keeps_others() {
    let test = boot(Request::get("/")).await;
    let plugins = test
        .app
        .filter(DT_PLUGINS_FILTER, json!({"other-plugin": {"version": "2.0"}}))
        .await
        .unwrap();

    assert_eq!(plugins["other-plugin"]["version"], json!("2.0"));
    let entry = &plugins["dt-plugin"];
    assert_eq!(entry["name"], json!("DT Plugin"));
    assert_eq!(entry["version"], json!(env!("CARGO_PKG_VERSION")));
    assert!(entry["plugin_url"].as_str().unwrap().ends_with("/dt-plugin/"));
}

#[tokio::test]
async fn test_init_installs_rewrite_rules_once() {
    let test = boot(Request::get("/")).await;
    test.fire(INIT_ACTION).await;
    test.fire(INIT_ACTION).await;

    let rules = test.host.rewrite_rules();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].0, "^dt/plugin/api/(.+)/?");
}

#[tokio::test]
async fn test_boot_without_declaration_files_uses_defaults() {
    let dir = tempdir().unwrap();
    let test = boot_with(dir.path(), Arc::new(MemoryHost::new()), Request::get("/")).await;
    let options = test.app.container().get::<Options>().unwrap();

    assert_eq!(options.get("greeting", None, false).unwrap(), None);
    assert_eq!(test.host.get_option("dt_plugin_greeting"), None);
    assert_eq!(test.host.registered_dependencies().map(|(p, _)| p.len()), Some(0));
    assert_eq!(test.app.filter("unknown", Value::Null).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_invalid_declaration_file_fails_boot() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("config")).unwrap();
    std::fs::write(dir.path().join("config/broken.toml"), "options = [").unwrap();

    let mut app = crate::kernel::bootstrap::Application::new(
        dir.path(),
        crate::host::HostServices::memory(Arc::new(MemoryHost::new())),
    )
    .with_request(Request::get("/"));

    let err = app.boot().await.unwrap_err();
    assert!(matches!(err, Error::KernelLifecycleError { .. }));
    assert!(!app.is_booted());
}
