use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use crate::audio::AudioFormat;
use crate::condensed::CondensedFormat;

/// Application configuration module
/// This module handles the configuration for period extraction, subtitle
/// matching and output, including loading, validating and saving it.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Milliseconds added before and after each dialogue entry
    #[serde(default = "default_padding_ms")]
    pub padding_ms: u64,

    /// Drop entries wholly enclosed in brackets, e.g. "(laughing)"
    #[serde(default = "default_true")]
    pub filter_parentheses: bool,

    /// Every character in this string is removed from dialogue text
    #[serde(default = "default_filtered_characters")]
    pub filtered_characters: String,

    /// Suffix between the video base name and the subtitle extension
    /// for exact-name matches (e.g. ".en" for "Movie.en.srt")
    #[serde(default)]
    pub subtitle_suffix: String,

    /// Lowest heuristic score accepted as a match (0 to 100)
    #[serde(default = "default_minimum_match_score")]
    pub minimum_match_score: u8,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Output configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Format for condensed subtitles
    #[serde(default)]
    pub subtitle_format: CondensedFormat,

    /// Format for condensed audio, none skips audio
    #[serde(default)]
    pub audio_format: Option<AudioFormat>,

    /// Inserted between the video stem and the output extension
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            subtitle_format: CondensedFormat::default(),
            audio_format: None,
            output_suffix: default_output_suffix(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_padding_ms() -> u64 {
    250
}

fn default_true() -> bool {
    true
}

fn default_filtered_characters() -> String {
    "♪♫".to_string()
}

fn default_minimum_match_score() -> u8 {
    40
}

fn default_output_suffix() -> String {
    ".condensed".to_string()
}

const MAX_PADDING_MS: u64 = 60_000;

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.minimum_match_score > 100 {
            return Err(anyhow!(
                "minimum_match_score must be between 0 and 100, got {}",
                self.minimum_match_score
            ));
        }

        if self.padding_ms > MAX_PADDING_MS {
            return Err(anyhow!(
                "padding_ms must not exceed {} ms, got {}",
                MAX_PADDING_MS, self.padding_ms
            ));
        }

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Save configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))
    }

    /// Load the configuration at `path`, writing a default one first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            padding_ms: default_padding_ms(),
            filter_parentheses: default_true(),
            filtered_characters: default_filtered_characters(),
            subtitle_suffix: String::new(),
            minimum_match_score: default_minimum_match_score(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
