#![cfg(test)]

use std::sync::Arc;

use serde_json::json;

use crate::admin::settings::SETTINGS_ROUTE_FILE;
use crate::controllers::settings::SETTINGS_NONCE_ACTION;
use crate::host::{AdminMenu, MemoryHost, NonceVerifier, OptionStore};
use crate::http::Request;
use crate::kernel::constants::ADMIN_MENU_ACTION;
use crate::tests::integration::common::{boot_with, plugin_root, TestApp};

const PAGE_HOOK: &str = "load-dt_extensions_page_dt-plugin";

async fn open_settings(host: Arc<MemoryHost>, request: Request) -> TestApp {
    let test = boot_with(&plugin_root(), host, request).await;
    test.fire(ADMIN_MENU_ACTION).await;
    test.fire(PAGE_HOOK).await;
    test
}

fn settings_post(host: &MemoryHost, greeting: &str) -> Request {
    let nonce = host.create_nonce(SETTINGS_NONCE_ACTION);
    Request::post("/wp-admin/admin.php?page=dt-plugin&tab=general")
        .with_form([("greeting", greeting), ("_wpnonce", nonce.as_str())])
}

#[tokio::test]
async fn test_admin_menu_registers_settings_page() {
    let host = Arc::new(MemoryHost::new());
    let test = boot_with(&plugin_root(), host.clone(), Request::get("/")).await;

    test.fire(ADMIN_MENU_ACTION).await;

    let pages = host.menu_pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].parent_slug, "dt_extensions");
    assert_eq!(pages[0].menu_title, "DT Plugin");
    assert_eq!(pages[0].capability, "manage_dt");
    assert_eq!(host.page_hook("dt-plugin").as_deref(), Some("dt_extensions_page_dt-plugin"));
    assert!(test.app.hooks().has_action(PAGE_HOOK).await);
    assert!(plugin_root().join("routes").join(SETTINGS_ROUTE_FILE).is_file());
}

#[tokio::test]
async fn test_general_tab_renders_with_tabs_and_default_greeting() {
    let host = Arc::new(MemoryHost::new());
    let test = open_settings(host.clone(), Request::get("/wp-admin/admin.php?page=dt-plugin&tab=general")).await;
    let output = test.output();

    assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(output.contains("nav-tab nav-tab-active\">General</a>"));
    assert!(output.contains("value=\"Hello from DT Plugin\""));
    assert!(output.contains("name=\"_wpnonce\""));
    assert_eq!(host.get_option("dt_plugin_greeting"), Some(json!("Hello from DT Plugin")));
}

#[tokio::test]
async fn test_page_without_tab_renders_general() {
    let test = open_settings(Arc::new(MemoryHost::new()), Request::get("/wp-admin/admin.php?page=dt-plugin")).await;
    assert!(test.output().starts_with("HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_unknown_tab_is_not_found() {
    let test = open_settings(
        Arc::new(MemoryHost::new()),
        Request::get("/wp-admin/admin.php?page=dt-plugin&tab=advanced"),
    )
    .await;
    assert!(test.output().starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[tokio::test]
async fn test_user_without_capability_is_forbidden() {
    let host = Arc::new(MemoryHost::new());
    host.revoke("manage_dt");
    let test = open_settings(host.clone(), Request::get("/wp-admin/admin.php?page=dt-plugin&tab=general")).await;

    assert!(test.output().starts_with("HTTP/1.1 403 Forbidden\r\n"));
    assert_eq!(host.get_option("dt_plugin_greeting"), None);
}

#[tokio::test]
async fn test_valid_post_saves_and_redirects() {
    let host = Arc::new(MemoryHost::new());
    let request = settings_post(&host, "Welcome");
    let test = open_settings(host.clone(), request).await;
    let output = test.output();

    assert!(output.starts_with("HTTP/1.1 302 Found\r\n"));
    assert!(output.contains("location: admin.php?page=dt-plugin&tab=general&updated=1\r\n"));
    assert_eq!(host.get_option("dt_plugin_greeting"), Some(json!("Welcome")));
    assert_eq!(host.statements(), vec!["START TRANSACTION", "COMMIT"]);
}

#[tokio::test]
async fn test_post_without_nonce_is_rejected() {
    let host = Arc::new(MemoryHost::new());
    let request = Request::post("/wp-admin/admin.php?page=dt-plugin&tab=general").with_form([("greeting", "Hi")]);
    let test = open_settings(host.clone(), request).await;
    let output = test.output();

    assert!(output.starts_with("HTTP/1.1 403 Forbidden\r\n"));
    assert!(output.ends_with("Could not verify request."));
    assert_eq!(host.get_option("dt_plugin_greeting"), None);
    assert!(host.statements().is_empty());
}

#[tokio::test]
async fn test_post_with_nonce_for_other_action_is_rejected() {
    let host = Arc::new(MemoryHost::new());
    let nonce = host.create_nonce("some_other_action");
    let request = Request::post("/wp-admin/admin.php?page=dt-plugin&tab=general")
        .with_form([("greeting", "Hi"), ("_wpnonce", nonce.as_str())]);
    let test = open_settings(host.clone(), request).await;

    assert!(test.output().ends_with("Could not verify request."));
    assert_eq!(host.get_option("dt_plugin_greeting"), None);
}

#[tokio::test]
async fn test_empty_greeting_fails_validation() {
    let host = Arc::new(MemoryHost::new());
    let request = settings_post(&host, "");
    let test = open_settings(host.clone(), request).await;

    assert!(test.output().starts_with("HTTP/1.1 422 Unprocessable Entity\r\n"));
    assert_eq!(host.get_option("dt_plugin_greeting"), None);
    assert!(host.statements().is_empty());
}

#[tokio::test]
async fn test_pending_store_error_is_reported_without_starting() {
    let host = Arc::new(MemoryHost::new());
    host.set_last_error(Some("Deadlock found when trying to get lock"));
    let request = settings_post(&host, "Welcome");
    let test = open_settings(host.clone(), request).await;
    let output = test.output();

    assert!(output.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert!(output.ends_with("Deadlock found when trying to get lock"));
    assert!(host.statements().is_empty());
    assert_eq!(host.get_option("dt_plugin_greeting"), None);
}

#[tokio::test]
async fn test_failed_option_write_rolls_back() {
    let host = Arc::new(MemoryHost::new());
    host.reject_option_writes("dt_plugin_greeting");
    let request = settings_post(&host, "Welcome");
    let test = open_settings(host.clone(), request).await;
    let output = test.output();

    assert!(output.starts_with("HTTP/1.1 500 Internal Server Error
"));
    assert!(output.ends_with("Host error: Host option 'dt_plugin_greeting' could not be stored"));
    assert_eq!(host.statements(), vec!["START TRANSACTION", "ROLLBACK"]);
    assert_eq!(host.get_option("dt_plugin_greeting"), None);
}

#[tokio::test]
async fn test_updated_flag_shows_notice() {
    let test = open_settings(
        Arc::new(MemoryHost::new()),
        Request::get("/wp-admin/admin.php?page=dt-plugin&tab=general&updated=1"),
    )
    .await;
    assert!(test.output().contains("Settings saved."));
}
