//! Route declaration files.
//!
//! ```toml
//! middleware = ["can:manage_dt"]
//!
//! [[routes]]
//! method = "POST"
//! path = "/wp-admin/dt-plugin/general"
//! handler = "SettingsController@update"
//! middleware = ["nonce:dt_plugin_settings"]
//! ```
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::loader::{parse_file, parse_str, ConfigFormat};
use crate::http::error::HttpError;
use crate::kernel::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDeclarations {
    /// Middleware applied to every route of the file
    #[serde(default)]
    pub middleware: Vec<String>,
    #[serde(default)]
    pub routes: Vec<RouteDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDeclaration {
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    pub handler: String,
    #[serde(default)]
    pub middleware: Vec<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl RouteDeclarations {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_value(parse_file(path)?, path)
    }

    pub fn parse(data: &str, format: ConfigFormat) -> Result<Self> {
        Self::from_value(parse_str(data, format)?, Path::new("<inline>"))
    }

    fn from_value(value: Value, path: &Path) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            HttpError::Declarations { path: path.to_path_buf(), reason: e.to_string() }.into()
        })
    }
}
