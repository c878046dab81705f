//! Integration tests for autowire-config

use autowire_config::*;
use autowire_log::{Format, Level};
use std::io::Write;

fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_toml_settings() {
    let file = write_file(
        ".toml",
        r#"
            [resolver]
            max_depth = 12

            [events]
            clear_after_dispatch = true

            [log]
            level = "debug"
            format = "compact"
        "#,
    );

    let settings = Settings::load_file(file.path()).unwrap();

    assert_eq!(settings.resolver.max_depth, 12);
    assert!(settings.events.clear_after_dispatch);
    assert!(settings.events.enable_logging);
    assert_eq!(settings.log.level, Level::Debug);
    assert_eq!(settings.log.format, Format::Compact);
}

#[test]
fn test_load_json_settings_with_missing_sections() {
    let file = write_file(".json", r#"{"events": {"enable_logging": false}}"#);

    let settings = Settings::load_file(file.path()).unwrap();

    assert!(!settings.events.enable_logging);
    assert_eq!(settings.resolver, Default::default());
    assert_eq!(settings.log, Default::default());
}

#[test]
fn test_load_file_with_wrong_types() {
    let file = write_file(".json", r#"{"resolver": {"max_depth": "deep"}}"#);

    assert!(matches!(
        Settings::load_file(file.path()),
        Err(ConfigError::DeserializationError(_))
    ));
}

#[test]
fn test_unsupported_extension() {
    let file = write_file(".yaml", "resolver: {}");

    assert!(matches!(
        Settings::load_file(file.path()),
        Err(ConfigError::LoadError(_))
    ));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        Settings::load_file("/nonexistent/autowire.toml"),
        Err(ConfigError::LoadError(_))
    ));
}

#[test]
fn test_file_then_env_overrides() {
    let file = write_file(".toml", "[resolver]\nmax_depth = 12\n");

    let mut settings = Settings::load_file(file.path()).unwrap();
    let env = EnvLoader::from_vars(
        Some(ENV_PREFIX.to_string()),
        [("AUTOWIRE_MAX_DEPTH", "4"), ("AUTOWIRE_DEBUG", "1")],
    );
    settings.apply_env(&env).unwrap();

    assert_eq!(settings.resolver.max_depth, 4);
    assert!(settings.log.debug);
    assert_eq!(settings.log.effective_level(), Level::Debug);
}

#[test]
fn test_load_rejects_depth_above_limit() {
    let file = write_file(".toml", "[resolver]\nmax_depth = 2000\n");

    // the file alone decodes; the full load validates it
    let settings = Settings::load_file(file.path()).unwrap();
    assert_eq!(settings.resolver.max_depth, 2000);

    assert!(matches!(
        Settings::load(file.path()),
        Err(ConfigError::ValidationError(_))
    ));
}
