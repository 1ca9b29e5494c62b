use std::fs;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde_json::json;
use tempfile::tempdir;

use crate::kernel::error::Error;
use crate::view::{Template, ViewEngine, ViewError};

#[test]
fn test_views_loaded_by_relative_name() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("settings")).unwrap();
    fs::write(dir.path().join("settings/general.hbs"), "<h2>{{title}}</h2>").unwrap();
    fs::write(dir.path().join("hello.hbs"), "Hello {{name}}").unwrap();
    fs::write(dir.path().join("readme.txt"), "not a view").unwrap();

    let engine = ViewEngine::from_directory(dir.path()).unwrap();

    assert_eq!(engine.names(), vec!["hello".to_string(), "settings/general".to_string()]);
    assert_eq!(engine.render("settings/general", &json!({"title": "General"})).unwrap(), "<h2>General</h2>");
}

#[test]
fn test_values_are_html_escaped() {
    let mut engine = ViewEngine::new();
    engine.register_template("hello", "Hello {{name}}").unwrap();
    let rendered = engine.render("hello", &json!({"name": "<b>x</b>"})).unwrap();
    assert_eq!(rendered, "Hello &lt;b&gt;x&lt;/b&gt;");
}

#[test]
fn test_layout_partial_block_and_year_helper() {
    let mut engine = ViewEngine::new();
    engine
        .register_template("layouts/plugin", "<main>{{> @partial-block}}</main><footer>{{year}}</footer>")
        .unwrap();
    engine
        .register_template("show", "{{#> layouts/plugin}}Name: {{name}}{{/layouts/plugin}}")
        .unwrap();

    let rendered = engine.render("show", &json!({"name": "admin"})).unwrap();
    assert_eq!(rendered, format!("<main>Name: admin</main><footer>{}</footer>", Utc::now().year()));
}

#[test]
fn test_missing_view_and_bad_template() {
    let mut engine = ViewEngine::new();
    let err = engine.render("absent", &json!({})).unwrap_err();
    assert!(matches!(err, Error::View(ViewError::NotFound { .. })));

    let err = engine.register_template("broken", "{{#if}}").unwrap_err();
    assert!(matches!(err, Error::View(ViewError::Template { .. })));
}

#[test]
fn test_template_wraps_view_in_layout() {
    let mut engine = ViewEngine::new();
    engine.register_template("layouts/template", "<div class=\"wrap\">{{{content}}}</div><p>{{title}}</p>").unwrap();
    engine.register_template("hello", "<h1>{{title}}</h1>").unwrap();
    let engine = Arc::new(engine);

    let template = Template::new(engine.clone(), "layouts/template");
    assert_eq!(
        template.render("hello", &json!({"title": "Hi"})).unwrap(),
        "<div class=\"wrap\"><h1>Hi</h1></div><p>Hi</p>"
    );

    let bare = Template::new(engine, "layouts/missing");
    assert_eq!(bare.render("hello", &json!({"title": "Hi"})).unwrap(), "<h1>Hi</h1>");
}
