use super::data::Config;
use super::io::ConfigError;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.server_url(), "http://127.0.0.1:5000");
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config
        .set_value("server-url", "http://chat.local:8000")
        .expect("set server");
    config.set_value("syntax", "off").expect("set syntax");
    config.set_value("request-timeout", "30").expect("set timeout");
    config.save_to_path(&config_path).expect("save");

    let loaded = Config::load_from_path(&config_path).expect("load");
    assert_eq!(loaded.server_url(), "http://chat.local:8000");
    assert!(!loaded.syntax_enabled());
    assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(30)));

    let mut loaded = loaded;
    loaded.unset_value("server-url").expect("unset");
    loaded.save_to_path(&config_path).expect("save again");
    let reloaded = Config::load_from_path(&config_path).expect("reload");
    assert_eq!(reloaded.server_url, None);
    assert!(!reloaded.syntax_enabled());
}

#[test]
fn invalid_toml_reports_parse_error_with_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "server_url = [").expect("write");

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    let config_err = err
        .downcast_ref::<ConfigError>()
        .expect("config error type");
    assert!(matches!(config_err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at "));
}

#[test]
fn set_value_rejects_bad_input() {
    let mut config = Config::default();
    assert!(config.set_value("server-url", "localhost:5000").is_err());
    assert!(config.set_value("theme", "dracula").is_err());
    assert!(config.set_value("syntax", "maybe").is_err());
    assert!(config.set_value("request-timeout", "soon").is_err());
    assert!(config.set_value("model", "x").is_err());
    assert_eq!(config, Config::default());
}

#[test]
fn endpoints_respect_override_and_paths() {
    let mut config = Config::default();
    config.set_value("send-path", "/api/chat").expect("set");
    let endpoints = config.endpoints(Some("http://other:9000"));
    assert_eq!(endpoints.send_url(), "http://other:9000/api/chat");
    assert_eq!(endpoints.clear_url(), "http://other:9000/clear");
}

#[test]
fn zero_timeout_means_no_timeout() {
    let config = Config {
        request_timeout_secs: Some(0),
        ..Default::default()
    };
    assert_eq!(config.request_timeout(), None);
}
