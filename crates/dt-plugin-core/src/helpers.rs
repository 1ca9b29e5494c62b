//! # Helpers
//!
//! Shorthands over a container handle for the things controllers and hook
//! callbacks reach for most: configuration, the current request, responses,
//! views, validation, options, transactions, paths and URLs.
use std::path::PathBuf;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::container::Container;
use crate::host::{DataStore, OptionStore};
use crate::http::response::{HTML_CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::http::{Content, Request, Response};
use crate::kernel::constants::NAMESPACE;
use crate::kernel::error::Result;
use crate::options::{self, Options};
use crate::persistence::{self, PersistenceError};
use crate::support::{PluginPaths, UrlGenerator};
use crate::validation::SchemaValidator;
use crate::view::{Template, ViewEngine};

pub fn config(container: &Container) -> Result<Arc<Config>> {
    container.get::<Config>()
}

/// A typed configuration value by dotted key.
pub fn config_value<T: DeserializeOwned>(container: &Container, key: &str) -> Result<T> {
    config(container)?.require(key)
}

pub fn request(container: &Container) -> Result<Arc<Request>> {
    container.get::<Request>()
}

/// A response built from the container's response prototype.
///
/// Mappings and sequences are JSON-encoded with
/// `Content-Type: application/json`; anything else is written as text.
/// `headers` are applied last.
pub fn response(
    container: &Container,
    content: impl Into<Content>,
    status: StatusCode,
    headers: &[(&str, &str)],
) -> Result<Response> {
    let prototype = Response::clone(&*container.get::<Response>()?);
    let mut response = match content.into() {
        Content::Json(value) => prototype
            .with_header("content-type", JSON_CONTENT_TYPE)?
            .write(&value.to_string()),
        Content::Text(text) => {
            let prototype = if prototype.header("content-type").is_none() {
                prototype.with_header("content-type", HTML_CONTENT_TYPE)?
            } else {
                prototype
            };
            prototype.write(&text)
        }
    }
    .with_status(status);
    for (name, value) in headers {
        response = response.with_header(name, value)?;
    }
    Ok(response)
}

pub fn json(value: &Value) -> Response {
    Response::json(value)
}

/// A `302` to `url`.
pub fn redirect(url: &str) -> Result<Response> {
    Response::redirect(url, StatusCode::FOUND)
}

/// Render a bare view as a `200` HTML response.
pub fn view<T: Serialize>(container: &Container, name: &str, data: &T) -> Result<Response> {
    let body = container.get::<ViewEngine>()?.render(name, data)?;
    response(container, body, StatusCode::OK, &[])
}

/// Render a view inside the page layout as a `200` HTML response.
pub fn template<T: Serialize>(container: &Container, name: &str, data: &T) -> Result<Response> {
    let body = container.get::<Template>()?.render(name, data)?;
    response(container, body, StatusCode::OK, &[])
}

/// Validated data, or the validation message.
pub fn validate(container: &Container, schema: &Value, data: &Value) -> Result<std::result::Result<Value, String>> {
    Ok(container.get::<SchemaValidator>()?.validate(schema, data))
}

pub fn plugin_option(container: &Container, key: &str, default: Option<Value>, required: bool) -> Result<Option<Value>> {
    container.get::<Options>()?.get(key, default, required)
}

pub fn set_plugin_option(container: &Container, key: &str, value: Value) -> Result<bool> {
    container.get::<Options>()?.set(key, value)
}

/// Set an unscoped host option.
pub fn set_option(container: &Container, name: &str, value: Value) -> Result<bool> {
    options::set_option(container.get::<dyn OptionStore>()?.as_ref(), name, value)
}

/// Run `work` in a data store transaction. The outer result carries
/// resolution failures; the inner one the store's or the work's own error.
pub fn transaction<F>(container: &Container, work: F) -> Result<std::result::Result<(), PersistenceError>>
where
    F: FnOnce() -> std::result::Result<(), String>,
{
    Ok(persistence::transaction(container.get::<dyn DataStore>()?.as_ref(), work))
}

/// `name` within the plugin's namespace, as used for namespaced hooks.
pub fn namespace_string(name: &str) -> String {
    format!("{}\\Plugin\\{}", NAMESPACE, name)
}

fn paths(container: &Container) -> Result<Arc<PluginPaths>> {
    container.get::<PluginPaths>()
}

pub fn plugin_path(container: &Container, path: &str) -> Result<PathBuf> {
    Ok(paths(container)?.plugin_path(path))
}

pub fn src_path(container: &Container, path: &str) -> Result<PathBuf> {
    Ok(paths(container)?.src_path(path))
}

pub fn resources_path(container: &Container, path: &str) -> Result<PathBuf> {
    Ok(paths(container)?.resources_path(path))
}

pub fn routes_path(container: &Container, path: &str) -> Result<PathBuf> {
    Ok(paths(container)?.routes_path(path))
}

pub fn views_path(container: &Container, path: &str) -> Result<PathBuf> {
    Ok(paths(container)?.views_path(path))
}

fn urls(container: &Container) -> Result<Arc<UrlGenerator>> {
    container.get::<UrlGenerator>()
}

pub fn plugin_url(container: &Container, path: &str) -> Result<String> {
    Ok(urls(container)?.plugin_url(path))
}

pub fn route_url(container: &Container, path: &str, key: &str) -> Result<String> {
    urls(container)?.route_url(path, key)
}

pub fn api_url(container: &Container, path: &str) -> Result<String> {
    urls(container)?.api_url(path)
}

pub fn web_url(container: &Container, path: &str) -> Result<String> {
    urls(container)?.web_url(path)
}

pub fn has_route_rewrite(container: &Container) -> Result<bool> {
    Ok(urls(container)?.has_route_rewrite())
}
