/*!
 * Tests for application configuration
 */

use std::fs;
use subcondense::app_config::{Config, LogLevel, OutputConfig};
use subcondense::audio::AudioFormat;
use subcondense::condensed::CondensedFormat;
use crate::common;

/// Test the documented defaults
#[test]
fn test_default_config_shouldHaveDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.padding_ms, 250);
    assert!(config.filter_parentheses);
    assert_eq!(config.filtered_characters, "♪♫");
    assert_eq!(config.subtitle_suffix, "");
    assert_eq!(config.minimum_match_score, 40);
    assert_eq!(config.output.subtitle_format, CondensedFormat::Srt);
    assert_eq!(config.output.audio_format, None);
    assert_eq!(config.output.output_suffix, ".condensed");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test validation bounds
#[test]
fn test_validate_withOutOfRangeValues_shouldFail() {
    let config = Config {
        minimum_match_score: 101,
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        padding_ms: 60_001,
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        padding_ms: 60_000,
        minimum_match_score: 100,
        ..Config::default()
    };
    assert!(config.validate().is_ok());
}

/// Test that missing fields fall back to their defaults
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{ "padding_ms": 0, "output": { "audio_format": "mp3" } }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.padding_ms, 0);
    assert_eq!(config.minimum_match_score, 40);
    assert_eq!(config.filtered_characters, "♪♫");
    assert_eq!(config.output, OutputConfig {
        subtitle_format: CondensedFormat::Srt,
        audio_format: Some(AudioFormat::Mp3),
        output_suffix: ".condensed".to_string(),
    });
}

/// Test that lowercase enum names are used on disk
#[test]
fn test_serialize_withLrcAndDebug_shouldUseLowercaseNames() {
    let mut config = Config::default();
    config.output.subtitle_format = CondensedFormat::Lrc;
    config.log_level = LogLevel::Debug;

    let json = serde_json::to_string(&config).unwrap();

    assert!(json.contains(r#""subtitle_format":"lrc""#));
    assert!(json.contains(r#""log_level":"debug""#));
    assert!(json.contains(r#""audio_format":null"#));
}

/// Test save and reload
#[test]
fn test_save_and_from_file_shouldRoundTrip() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");
    let config = Config {
        padding_ms: 400,
        subtitle_suffix: ".ja".to_string(),
        filter_parentheses: false,
        ..Config::default()
    };

    config.save(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded, config);
}

/// Test that a missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config, Config::default());
    assert!(path.exists());
    assert_eq!(Config::from_file(&path).unwrap(), Config::default());
}

/// Test that an unreadable config reports an error
#[test]
fn test_from_file_withInvalidJson_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::from_file(&path).is_err());
    assert!(Config::load_or_create(&path).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

/// Test log level conversion
#[test]
fn test_to_level_filter_shouldMapEveryLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
