//! Configuration tests
//!
//! Round-trips guard against `to_toml()` drifting from `FileConfig`: a field
//! added to one but not the other fails here.

use super::*;
use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

#[test]
fn test_config_roundtrip_preserves_values() {
    let mut config = Config::default();
    config.api_url = "https://tracker.example.com/api".to_string();
    config.credentials_path = PathBuf::from("/tmp/creds \"quoted\"");
    config.request_timeout_secs = 42;
    config.read_retry = false;
    config.theme = "light".to_string();
    config.ui.restore_active_timers = false;
    config.ui.redraw_interval_ms = 500;
    config.ui.show_logs = true;
    config.logging.level = "debug".to_string();
    config.logging.file_enabled = true;
    config.logging.file_rotation = LogRotation::Hourly;

    let file: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    let back = Config::resolve(file, no_env);

    assert_eq!(back.api_url, config.api_url);
    assert_eq!(back.credentials_path, config.credentials_path);
    assert_eq!(back.request_timeout_secs, 42);
    assert!(!back.read_retry);
    assert_eq!(back.theme, "light");
    assert_eq!(back.ui, config.ui);
    assert_eq!(back.logging.level, "debug");
    assert!(back.logging.file_enabled);
    assert_eq!(back.logging.file_rotation, LogRotation::Hourly);
}

#[test]
fn test_env_overrides_file() {
    let file: FileConfig = toml::from_str(
        r#"
api_url = "http://file/api"
theme = "mono"
request_timeout_secs = 5
"#,
    )
    .unwrap();

    let config = Config::resolve(
        file,
        env_from(&[
            ("TASKTIME_API_URL", "http://env/api"),
            ("TASKTIME_TIMEOUT_SECS", "not-a-number"),
        ]),
    );
    assert_eq!(config.api_url, "http://env/api");
    assert_eq!(config.theme, "mono");
    // Unparseable env value falls through to the file
    assert_eq!(config.request_timeout_secs, 5);
}

#[test]
fn test_empty_file_gives_defaults() {
    let file: FileConfig = toml::from_str("").unwrap();
    let config = Config::resolve(file, no_env);
    let defaults = Config::default();
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.ui, defaults.ui);
    assert!(config.ui.restore_active_timers);
    assert!(config.read_retry);
}

#[test]
fn test_partial_sections() {
    let file: FileConfig = toml::from_str(
        r#"
[ui]
redraw_interval_ms = 10

[logging]
file_rotation = "weekly"
"#,
    )
    .unwrap();
    let config = Config::resolve(file, no_env);
    assert_eq!(config.ui.redraw_interval_ms, 50);
    assert!(config.ui.restore_active_timers);
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
}

#[test]
fn test_timeout_never_zero() {
    let config = Config {
        request_timeout_secs: 0,
        ..Config::default()
    };
    assert_eq!(config.request_timeout(), std::time::Duration::from_secs(1));
}
