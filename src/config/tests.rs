//! Configuration tests
//!
//! The generated template must parse back into the same values, so a new
//! field that is loaded but never serialized (or the reverse) shows up here.

use super::*;
use crate::table::{Format, ResponsiveConfig};
use std::collections::HashMap;

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn parse(toml_str: &str) -> FileConfig {
    toml::from_str(toml_str).unwrap_or_else(|e| panic!("TOML:\n{}\nError: {}", toml_str, e))
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let reloaded = Config::from_sources(parse(&config.to_toml()), no_env);

    assert_eq!(reloaded.api_url, config.api_url);
    assert_eq!(reloaded.timeout_secs, config.timeout_secs);
    assert_eq!(reloaded.locale, config.locale);
    assert_eq!(reloaded.theme, config.theme);
    assert_eq!(reloaded.page_size, config.page_size);
    assert_eq!(reloaded.search_debounce_ms, config.search_debounce_ms);
    assert_eq!(reloaded.cart_debounce_ms, config.cart_debounce_ms);
    assert_eq!(reloaded.demo_bind, config.demo_bind);
    assert_eq!(reloaded.logging.level, config.logging.level);
    assert_eq!(reloaded.logging.file_rotation, config.logging.file_rotation);
    assert_eq!(reloaded.table, config.table);
}

#[test]
fn test_config_roundtrip_with_table_override() {
    let mut config = Config::default();
    config.locale = Locale::En;
    config.page_size = 25;
    config.logging.file_enabled = true;
    config.logging.file_rotation = LogRotation::Hourly;
    config.table.responsive = Some(ResponsiveConfig {
        mobile_hidden_formats: vec![Format::Images, Format::DateTime],
        tablet_hidden_formats: Vec::new(),
        mobile_hidden_ids: vec!["category.name".into()],
        tablet_hidden_ids: Vec::new(),
    });

    let reloaded = Config::from_sources(parse(&config.to_toml()), no_env);
    assert_eq!(reloaded.locale, Locale::En);
    assert_eq!(reloaded.page_size, 25);
    assert!(reloaded.logging.file_enabled);
    assert_eq!(reloaded.logging.file_rotation, LogRotation::Hourly);
    assert_eq!(reloaded.table, config.table);
}

// ─────────────────────────────────────────────────────────────────────────────
// Layering
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_env_overrides_file() {
    let file = parse(
        r#"
api_url = "https://file.example/api"
locale = "en"
theme = "Terminal"
"#,
    );
    let config = Config::from_sources(
        file,
        env_from(&[
            ("STOREDESK_API_URL", "https://env.example/api"),
            ("STOREDESK_LOCALE", "vi"),
        ]),
    );
    assert_eq!(config.api_url, "https://env.example/api");
    assert_eq!(config.locale, Locale::Vi);
    assert_eq!(config.theme, "Terminal");
}

#[test]
fn test_runtime_flags_are_env_only() {
    let config = Config::from_sources(
        FileConfig::default(),
        env_from(&[("STOREDESK_NO_TUI", "1"), ("STOREDESK_DEMO", "true")]),
    );
    assert!(!config.enable_tui);
    assert!(config.demo_mode);
    assert_eq!(config.effective_api_url(), "http://127.0.0.1:7878");

    let config = Config::from_sources(FileConfig::default(), no_env);
    assert!(config.enable_tui);
    assert!(!config.demo_mode);
    assert_eq!(config.effective_api_url(), config.api_url);
}

#[test]
fn test_invalid_values_fall_back() {
    let file = parse(
        r#"
page_size = 0
timeout_secs = 0
demo_bind = "not an address"
locale = "fr"
"#,
    );
    let config = Config::from_sources(file, no_env);
    assert_eq!(config.page_size, 1);
    assert_eq!(config.timeout_secs, 1);
    assert_eq!(config.demo_bind, Config::default().demo_bind);
    assert_eq!(config.locale, Locale::Vi);
}

#[test]
fn test_unknown_format_in_table_section_is_parse_error() {
    let result: Result<FileConfig, _> = toml::from_str(
        r#"
[table]
mobile_hidden_formats = ["sparkline"]
"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_partial_table_section_replaces_defaults() {
    let file = parse(
        r#"
[table]
tablet_hidden_ids = ["description"]
"#,
    );
    let config = Config::from_sources(file, no_env);
    let responsive = config.table.responsive.clone().unwrap();
    assert!(responsive.mobile_hidden_formats.is_empty());
    assert_eq!(responsive.tablet_hidden_ids, vec!["description".to_string()]);

    // Global override beats a screen's own rules
    let screen = ResponsiveConfig {
        tablet_hidden_formats: vec![Format::Boolean],
        ..ResponsiveConfig::default()
    };
    assert_eq!(config.table.resolve(Some(screen)), responsive);
}

#[test]
fn test_table_resolution_without_override() {
    let settings = TableSettings::default();
    assert_eq!(settings.resolve(None), ResponsiveConfig::default());

    let screen = ResponsiveConfig {
        mobile_hidden_ids: vec!["street".into()],
        ..ResponsiveConfig::default()
    };
    assert_eq!(settings.resolve(Some(screen.clone())), screen);
}

#[test]
fn test_log_rotation_parsing() {
    assert_eq!(LogRotation::from_str("HOURLY"), LogRotation::Hourly);
    assert_eq!(LogRotation::from_str("never"), LogRotation::Never);
    assert_eq!(LogRotation::from_str("weekly"), LogRotation::Daily);
}
