#![cfg(test)]

use std::sync::Arc;

use crate::controllers::magic_link::{starter_app, STARTER_MAGIC_APP};
use crate::host::{MemoryHost, PostMetaStore};
use crate::http::Request;
use crate::kernel::constants::{PLUGIN_SLUG, TEMPLATE_REDIRECT_ACTION};
use crate::magic_link::MagicLinks;
use crate::tests::integration::common::{boot, boot_with, plugin_root};

#[tokio::test]
async fn test_starter_app_is_registered_through_filter() {
    let test = boot(Request::get("/")).await;
    let links = test.app.container().get::<MagicLinks>().unwrap();

    let app = links.app(PLUGIN_SLUG, STARTER_MAGIC_APP).await.unwrap();
    assert_eq!(app, Some(starter_app()));
    assert_eq!(links.app(PLUGIN_SLUG, "missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_generated_link_opens_magic_page() {
    let host = Arc::new(MemoryHost::new());
    host.set_user(7, "ada");
    let url = {
        let test = boot_with(&plugin_root(), host.clone(), Request::get("/")).await;
        let links = test.app.container().get::<MagicLinks>().unwrap();
        links.url(PLUGIN_SLUG, STARTER_MAGIC_APP, 7).await.unwrap()
    };
    let path = url.strip_prefix("http://localhost").unwrap().to_string();
    assert!(path.starts_with("/dt-plugin/starter-magic-link/"));

    let test = boot_with(&plugin_root(), host.clone(), Request::get(&path)).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;

    let output = test.output();
    assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(output.contains("<b>Name: ada</b>"));
    assert!(output.contains("Visit subpage"));
    assert!(output.contains("<h1>Plugin</h1>"));
}

#[tokio::test]
async fn test_link_key_is_stable() {
    let test = boot(Request::get("/")).await;
    let links = test.app.container().get::<MagicLinks>().unwrap();

    let first = links.url(PLUGIN_SLUG, STARTER_MAGIC_APP, 3).await.unwrap();
    let second = links.url(PLUGIN_SLUG, STARTER_MAGIC_APP, 3).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(links.url(PLUGIN_SLUG, "missing", 3).await.unwrap(), "");
}

#[tokio::test]
async fn test_subpage_and_unknown_key() {
    let host = Arc::new(MemoryHost::new());
    host.update_post_meta(2, &starter_app().meta_key, "feedface").unwrap();

    let test = boot_with(
        &plugin_root(),
        host.clone(),
        Request::get("/?dt-plugin-magic=starter-magic-link/feedface/subpage"),
    )
    .await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;
    assert!(test.output().contains("Subpage for admin"));

    let test = boot_with(&plugin_root(), host, Request::get("/dt-plugin/starter-magic-link/deadbeef")).await;
    test.fire(TEMPLATE_REDIRECT_ACTION).await;
    assert!(test.output().starts_with("HTTP/1.1 404 Not Found\r\n"));
}
