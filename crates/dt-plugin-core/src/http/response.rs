use std::borrow::Cow;

use http::header::{HeaderMap, HeaderName, HeaderValue, ALLOW, CONTENT_TYPE, LOCATION};
use http::{Method, StatusCode};
use serde_json::Value;

use crate::http::error::HttpError;
use crate::kernel::error::Result;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body content accepted by [`Response::content`].
///
/// Mappings and sequences are JSON-encoded; everything else is text.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Json(Value),
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(_) | Value::Array(_) => Content::Json(value),
            Value::String(text) => Content::Text(text),
            Value::Null => Content::Text(String::new()),
            other => Content::Text(other.to_string()),
        }
    }
}

/// An outgoing response. "with" operations consume and return it.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Empty `200 OK`.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// HTML response.
    pub fn html(body: impl Into<String>) -> Self {
        Self::new()
            .with_header_value(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE))
            .with_body(body.into())
    }

    /// JSON-encoded response with `Content-Type: application/json`.
    pub fn json(value: &Value) -> Self {
        Self::new()
            .with_header_value(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .with_body(value.to_string())
    }

    pub fn content(content: impl Into<Content>) -> Self {
        match content.into() {
            Content::Text(text) => Self::html(text),
            Content::Json(value) => Self::json(&value),
        }
    }

    pub fn not_found() -> Self {
        Self::html("Not Found").with_status(StatusCode::NOT_FOUND)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::html(message).with_status(StatusCode::FORBIDDEN)
    }

    /// `405` listing the methods the path does accept.
    pub fn method_not_allowed(allowed: &[Method]) -> Self {
        let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
        let response = Self::html("Method Not Allowed").with_status(StatusCode::METHOD_NOT_ALLOWED);
        match HeaderValue::from_str(&allow) {
            Ok(value) => response.with_header_value(ALLOW, value),
            Err(_) => response,
        }
    }

    pub fn redirect(url: &str, status: StatusCode) -> Result<Self> {
        let location = HeaderValue::from_str(url)
            .map_err(|e| HttpError::InvalidHeader { name: LOCATION.to_string(), reason: e.to_string() })?;
        Ok(Self::new().with_status(status).with_header_value(LOCATION, location))
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(self, name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::InvalidHeader { name: name.to_string(), reason: e.to_string() })?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| HttpError::InvalidHeader { name: name.to_string(), reason: e.to_string() })?;
        Ok(self.with_header_value(header_name, header_value))
    }

    pub fn with_header_value(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Append to the body.
    pub fn write(mut self, chunk: &str) -> Self {
        self.body.extend_from_slice(chunk.as_bytes());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_json(&self) -> bool {
        self.header(CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.starts_with(JSON_CONTENT_TYPE))
    }
}
