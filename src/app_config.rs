use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::checker::{MatchOrder, DEFAULT_REGEX_SIZE_LIMIT};
use crate::text_decoder::TextDecoder;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Rule matching settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Format and decoding settings
    #[serde(default)]
    pub formats: FormatsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Rule matching configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Order of matches within one result
    #[serde(default)]
    pub match_order: MatchOrder,

    /// Compiled-size ceiling for one rule pattern, in bytes
    #[serde(default = "default_regex_size_limit")]
    pub regex_size_limit: usize,

    /// Largest subtitle file accepted, in bytes
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,

    /// Files analyzed at once in folder mode
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            match_order: MatchOrder::default(),
            regex_size_limit: default_regex_size_limit(),
            max_input_bytes: default_max_input_bytes(),
            concurrency: default_concurrency(),
        }
    }
}

/// Subtitle format configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FormatsConfig {
    /// Code page tried after UTF-8 for plain text files (WHATWG label)
    #[serde(default = "default_legacy_encoding")]
    pub legacy_encoding: String,

    /// Format used when none is given on export
    #[serde(default = "default_export_format")]
    pub default_export_format: String,
}

impl Default for FormatsConfig {
    fn default() -> Self {
        Self {
            legacy_encoding: default_legacy_encoding(),
            default_export_format: default_export_format(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
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
    // @returns: Matching filter for the log facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_regex_size_limit() -> usize {
    DEFAULT_REGEX_SIZE_LIMIT
}

fn default_max_input_bytes() -> u64 {
    20 * 1024 * 1024 // 20 MiB, far above any real subtitle file
}

fn default_concurrency() -> usize {
    4
}

fn default_legacy_encoding() -> String {
    // Windows code page 949, the usual encoding of Korean subtitle scripts
    "euc-kr".to_string()
}

fn default_export_format() -> String {
    "srt".to_string()
}

impl Config {
    /// Load configuration from a JSON file, or create the file with defaults
    /// when it does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if TextDecoder::encoding_for_label(&self.formats.legacy_encoding).is_none() {
            return Err(anyhow!("Unknown legacy encoding: {}", self.formats.legacy_encoding));
        }

        if self.formats.default_export_format.trim().is_empty() {
            return Err(anyhow!("Default export format must not be empty"));
        }

        if self.analysis.regex_size_limit == 0 {
            return Err(anyhow!("regex_size_limit must be greater than zero"));
        }

        if self.analysis.max_input_bytes == 0 {
            return Err(anyhow!("max_input_bytes must be greater than zero"));
        }

        if self.analysis.concurrency == 0 {
            return Err(anyhow!("concurrency must be greater than zero"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            analysis: AnalysisConfig::default(),
            formats: FormatsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
