//! Declaration file formats and directory loading.
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::Config;
use crate::config::error::ConfigError;
use crate::kernel::error::Result;
use crate::utils::fs::find_files;

/// Format of a declaration file (config or routes), picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    /// `.yaml` / `.yml`
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// `.toml`
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Canonical extension
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    fn label(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "TOML",
        }
    }
}

/// Parse a declaration document into a JSON value tree.
pub fn parse_str(data: &str, format: ConfigFormat) -> Result<Value> {
    let parse_error = |message: String| ConfigError::Parse { format: format.label(), path: None, message };
    let value = match format {
        ConfigFormat::Json => serde_json::from_str(data).map_err(|e| parse_error(e.to_string()))?,
        #[cfg(feature = "yaml-config")]
        ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| parse_error(e.to_string()))?,
        #[cfg(feature = "toml-config")]
        ConfigFormat::Toml => toml::from_str(data).map_err(|e| parse_error(e.to_string()))?,
    };
    Ok(value)
}

/// Read and parse a declaration file, picking the format from its extension.
pub fn parse_file(path: &Path) -> Result<Value> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat { path: path.to_path_buf() })?;
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    parse_str(&data, format).map_err(|e| match e {
        crate::kernel::error::Error::Config(ConfigError::Parse { format, message, .. }) => {
            ConfigError::Parse { format, path: Some(path.to_path_buf()), message }.into()
        }
        other => other,
    })
}

/// Merges every recognised declaration file of a directory into a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Files are merged in file-name order; unrecognised extensions are
    /// skipped. A missing directory merges nothing. Returns the number of
    /// files merged.
    pub fn load_dir(dir: &Path, config: &mut Config) -> Result<usize> {
        if !dir.is_dir() {
            log::debug!("No configuration directory at {:?}", dir);
            return Ok(0);
        }
        let mut files = find_files(dir, &|path: &Path| ConfigFormat::from_path(path).is_some())
            .map_err(|source| ConfigError::Io { path: dir.to_path_buf(), source })?;
        files.sort();

        for file in &files {
            log::debug!("Merging configuration file {:?}", file);
            config.merge(parse_file(file)?)?;
        }
        Ok(files.len())
    }
}
