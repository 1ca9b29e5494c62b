use std::sync::Arc;

use serde_json::{json, Value};

use crate::controllers::{ApiController, HelloController, SettingsController};
use crate::host::MemoryHost;
use crate::http::{HandlerRegistry, Request, Response, Route, StatusCode};
use crate::kernel::constants::VERSION;
use crate::tests::integration::common::{boot, boot_with, plugin_root};

#[tokio::test]
async fn test_every_declared_handler_is_registered() {
    let test = boot(Request::get("/")).await;
    let container = test.app.container();
    let handlers = container.get::<HandlerRegistry>().unwrap();

    assert_eq!(handlers.names().len(), 6);
    for file in ["web.toml", "api.toml", "settings.toml", "magic.toml"] {
        let route = Route::from_container(container).unwrap().from_route_file(file);
        assert!(route.is_ok(), "{} should load", file);
    }
}

#[test]
fn test_api_hello_defaults_to_world() {
    let response = ApiController.hello(&Request::get("/hello"), Response::new()).unwrap();
    let payload: Value = serde_json::from_slice(response.body()).unwrap();

    assert!(response.is_json());
    assert_eq!(payload, json!({ "message": "Hello, World!", "version": VERSION }));
}

#[test]
fn test_api_hello_reads_form_input() {
    let request = Request::post("/hello").with_form([("name", "Ada")]);
    let response = ApiController.hello(&request, Response::new()).unwrap();
    let payload: Value = serde_json::from_slice(response.body()).unwrap();

    assert_eq!(payload["message"], json!("Hello, Ada!"));
}

#[tokio::test]
async fn test_hello_uses_route_parameter() {
    let test = boot(Request::get("/")).await;
    let controller = HelloController::from_container(test.app.container()).unwrap();

    let mut params = std::collections::BTreeMap::new();
    params.insert("name".to_string(), "Grace".to_string());
    let request = Request::get("/hello/Grace").with_route_params(params);
    let response = controller.show(&request, Response::new()).unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.body_text().contains("<h1>Hello, Grace!</h1>"));
}

#[tokio::test]
async fn test_settings_update_keeps_option_on_invalid_input() {
    let host = Arc::new(MemoryHost::new());
    let test = boot_with(&plugin_root(), host.clone(), Request::get("/")).await;
    let controller = SettingsController::from_container(test.app.container()).unwrap();

    let long = "x".repeat(201);
    let request = Request::post("/wp-admin/dt-plugin/general").with_form([("greeting", long.as_str())]);
    let response = controller.update(&request, Response::new()).unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(host.statements().is_empty());
}
