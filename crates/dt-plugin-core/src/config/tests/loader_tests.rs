use std::fs;

use serde_json::json;
use tempfile::tempdir;

use crate::config::loader::{parse_str, ConfigFormat, ConfigLoader};
use crate::config::{Config, ConfigError};
use crate::kernel::error::Error;

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path("a/b.JSON".as_ref()), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path("plugin.toml".as_ref()), Some(ConfigFormat::Toml));
    assert_eq!(ConfigFormat::from_path("plugin.yml".as_ref()), Some(ConfigFormat::Yaml));
    assert_eq!(ConfigFormat::from_path("plugin.php".as_ref()), None);
    assert_eq!(ConfigFormat::Yaml.extension(), "yaml");
}

#[test]
fn test_parse_toml_and_yaml() {
    let toml = parse_str("[plugin]\nname = \"DT Plugin\"\n", ConfigFormat::Toml).unwrap();
    assert_eq!(toml, json!({"plugin": {"name": "DT Plugin"}}));

    let yaml = parse_str("plugin:\n  name: DT Plugin\n", ConfigFormat::Yaml).unwrap();
    assert_eq!(yaml, toml);

    let err = parse_str("{not json", ConfigFormat::Json).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse { format: "JSON", .. })));
}

#[test]
fn test_load_dir_merges_in_file_name_order() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.toml"), "[plugin]\nname = \"First\"\nslug = \"dt-plugin\"\n").unwrap();
    fs::write(dir.path().join("b.json"), r#"{"plugin": {"name": "Second"}}"#).unwrap();
    fs::write(dir.path().join("README.md"), "ignored").unwrap();

    let mut config = Config::new();
    let merged = ConfigLoader::load_dir(dir.path(), &mut config).unwrap();

    assert_eq!(merged, 2);
    assert_eq!(config.get::<String>("plugin.name").as_deref(), Some("Second"));
    assert_eq!(config.get::<String>("plugin.slug").as_deref(), Some("dt-plugin"));
}

#[test]
fn test_load_dir_reports_file_in_parse_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.json"), "{").unwrap();

    let mut config = Config::new();
    let err = ConfigLoader::load_dir(dir.path(), &mut config).unwrap_err();
    match err {
        Error::Config(ConfigError::Parse { path: Some(path), .. }) => assert!(path.ends_with("broken.json")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_load_missing_dir_is_empty() {
    let dir = tempdir().unwrap();
    let mut config = Config::new();
    assert_eq!(ConfigLoader::load_dir(&dir.path().join("config"), &mut config).unwrap(), 0);
    assert_eq!(config, Config::new());
}
