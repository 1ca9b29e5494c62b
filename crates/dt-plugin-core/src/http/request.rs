use std::collections::BTreeMap;
use std::io::Read;

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::form_urlencoded;

use crate::http::error::HttpError;
use crate::kernel::error::Result;

/// An incoming request. Immutable: every `with_*` returns a derived copy.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: BTreeMap<String, String>,
    headers: HeaderMap,
    body: Vec<u8>,
    params: BTreeMap<String, String>,
    attributes: BTreeMap<String, Value>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new(Method::GET, "/")
    }
}

impl Request {
    /// Build a request from a method and a URI (`/path?query`).
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = split_uri(uri);
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Vec::new(),
            params: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Build a request from a textual method name.
    pub fn parse(method: &str, uri: &str) -> Result<Self> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| HttpError::InvalidMethod { method: method.to_string() })?;
        Ok(Self::new(method, uri))
    }

    /// Capture the current request from CGI-style environment variables
    /// (`REQUEST_METHOD`, `REQUEST_URI`, `CONTENT_TYPE`, `CONTENT_LENGTH`,
    /// `HTTP_*`) with the body read from stdin. Missing values fall back to
    /// `GET /`; unusable headers are skipped.
    pub fn capture() -> Self {
        let vars: Vec<(String, String)> = std::env::vars().collect();
        let length = content_length(&vars);
        let mut body = Vec::new();
        if length > 0 {
            if let Err(e) = std::io::stdin().lock().take(length).read_to_end(&mut body) {
                log::warn!("Failed to read request body: {}", e);
                body.clear();
            }
        }
        Self::from_cgi(vars, body)
    }

    /// Request from CGI variables without a body.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::from_cgi(vars, Vec::new())
    }

    /// Request from CGI variables and an already-read body.
    pub fn from_cgi<I>(vars: I, body: Vec<u8>) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut method = Method::GET;
        let mut uri = "/".to_string();
        let mut headers = HeaderMap::new();
        for (key, value) in vars {
            let name = match key.as_str() {
                "REQUEST_METHOD" => {
                    if let Ok(m) = Method::from_bytes(value.to_ascii_uppercase().as_bytes()) {
                        method = m;
                    }
                    continue;
                }
                "REQUEST_URI" => {
                    uri = value;
                    continue;
                }
                "CONTENT_TYPE" => CONTENT_TYPE.as_str().to_string(),
                "CONTENT_LENGTH" => CONTENT_LENGTH.as_str().to_string(),
                _ => {
                    let Some(name) = key.strip_prefix("HTTP_") else { continue };
                    name.to_ascii_lowercase().replace('_', "-")
                }
            };
            if value.is_empty() {
                continue;
            }
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                headers.insert(name, value);
            }
        }
        let mut request = Self::new(method, &uri);
        request.headers = headers;
        request.body = body;
        request
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value by case-insensitive name; non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as `application/x-www-form-urlencoded`. JSON bodies
    /// decode as an empty form.
    pub fn form(&self) -> BTreeMap<String, String> {
        if self.is_json() {
            return BTreeMap::new();
        }
        form_urlencoded::parse(&self.body).into_owned().collect()
    }

    /// A request input by name: query parameter first, then form field.
    pub fn input(&self, key: &str) -> Option<String> {
        self.query
            .get(key)
            .cloned()
            .or_else(|| self.form().remove(key))
    }

    /// Body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    pub fn is_json(&self) -> bool {
        self.header(CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.starts_with("application/json"))
    }

    /// Route parameter captured by the router.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Same request aimed at another URI. Query parameters carried by `uri`
    /// are added to (and override) the existing ones.
    pub fn with_path(mut self, uri: &str) -> Self {
        let (path, query) = split_uri(uri);
        self.path = path;
        self.query.extend(query);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::InvalidHeader { name: name.to_string(), reason: e.to_string() })?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| HttpError::InvalidHeader { name: name.to_string(), reason: e.to_string() })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Url-encoded form body with the matching content type.
    pub fn with_form<'a, I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let body = form_urlencoded::Serializer::new(String::new()).extend_pairs(fields).finish();
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        self.body = body.into_bytes();
        self
    }

    pub fn with_route_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }
}

/// Upper bound on a captured request body.
pub const MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;

/// Declared `CONTENT_LENGTH`, clamped to [`MAX_BODY_BYTES`]; unparsable reads as 0.
pub(crate) fn content_length(vars: &[(String, String)]) -> u64 {
    vars.iter()
        .find(|(key, _)| key == "CONTENT_LENGTH")
        .and_then(|(_, value)| value.trim().parse::<u64>().ok())
        .map_or(0, |length| length.min(MAX_BODY_BYTES))
}

fn split_uri(uri: &str) -> (String, BTreeMap<String, String>) {
    let (path, query) = match uri.split_once('?') {
        Some((path, query)) => (path, query),
        None => (uri, ""),
    };
    let path = format!("/{}", path.trim_start_matches('/'));
    let query = form_urlencoded::parse(query.as_bytes()).into_owned().collect();
    (path, query)
}
