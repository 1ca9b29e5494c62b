#![cfg(test)]

use std::fs;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::tempdir;

use crate::host::{MemoryHost, NonceVerifier};
use crate::http::{Method, Request};
use crate::kernel::constants::TEMPLATE_REDIRECT_ACTION;
use crate::providers::route::{dispatch_public, match_route_file};
use crate::support::UrlGenerator;
use crate::tests::integration::common::{boot, boot_with, copy_plugin_root, plugin_root};

fn body(output: &str) -> &str {
    output.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
}

#[tokio::test]
async fn test_web_route_by_path() {
    let test = boot(Request::get("/dt/plugin/hello")).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;

    let output = test.output();
    assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(output.contains("<h1>Hello, World!</h1>"));
    assert!(output.contains("<body class=\"dt-plugin\">"));
}

#[tokio::test]
async fn test_web_route_by_query_var() {
    let test = boot(Request::get("/?dt-plugin=hello/Ada")).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;

    assert!(test.output().contains("<h1>Hello, Ada!</h1>"));
}

#[tokio::test]
async fn test_longest_prefix_selects_api_routes() {
    let test = boot(Request::get("/dt/plugin/api/hello?name=Ada")).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;

    let output = test.output();
    assert!(output.contains("content-type: application/json\r\n"));
    let payload: Value = serde_json::from_str(body(&output)).unwrap();
    assert_eq!(payload["message"], json!("Hello, Ada!"));
}

#[tokio::test]
async fn test_unrelated_request_is_left_to_host() {
    let test = boot(Request::get("/blog/some-post")).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;

    assert_eq!(test.output(), "");
    assert!(!dispatch_public(test.app.container()).unwrap());
}

#[tokio::test]
async fn test_prefix_must_end_at_segment_boundary() {
    let test = boot(Request::get("/dt/pluginx/hello")).await;
    let urls = test.app.container().get::<UrlGenerator>().unwrap();

    assert!(match_route_file(&urls, &Request::get("/dt/pluginx/hello")).is_none());
    let (file, path) = match_route_file(&urls, &Request::get("/dt/plugin")).unwrap();
    assert_eq!((file.file.as_str(), path.as_str()), ("web.toml", "/"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let test = boot(Request::get("/dt/plugin/missing")).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;

    assert!(test.output().starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
    let test = boot(Request::new(Method::DELETE, "/dt/plugin/api/hello")).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;

    let output = test.output();
    assert!(output.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    assert!(output.contains("allow: GET, POST\r\n"));
}

#[tokio::test]
async fn test_api_post_requires_nonce_header() {
    let test = boot(Request::post("/dt/plugin/api/hello")).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;
    assert!(test.output().starts_with("HTTP/1.1 403 Forbidden\r\n"));

    let host = Arc::new(MemoryHost::new());
    let nonce = host.create_nonce("wp_rest");
    let request = Request::post("/dt/plugin/api/hello").with_header("X-WP-Nonce", &nonce).unwrap();
    let test = boot_with(&plugin_root(), host, request).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;
    assert!(test.output().starts_with("HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_configured_global_middleware_applies_to_public_routes() {
    let dir = tempdir().unwrap();
    copy_plugin_root(dir.path());
    fs::write(dir.path().join("config/routes.toml"), "[routes]\nmiddleware = [\"can:read\"]\n").unwrap();

    let host = Arc::new(MemoryHost::new());
    host.revoke("read");
    let test = boot_with(dir.path(), host.clone(), Request::get("/dt/plugin/hello")).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;
    assert!(test.output().starts_with("HTTP/1.1 403 Forbidden\r\n"));

    host.grant("read");
    let test = boot_with(dir.path(), host, Request::get("/dt/plugin/hello")).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;
    assert!(test.output().starts_with("HTTP/1.1 200 OK\r\n"));
}
