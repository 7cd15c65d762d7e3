use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use log::warn;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language, as a name ("Bulgarian") or ISO code ("bg")
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation API settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Retry settings applied per chunk
    #[serde(default)]
    pub retry: RetryConfig,

    /// Input and output file settings
    #[serde(default)]
    pub files: FilesConfig,

    /// API key storage settings
    #[serde(default)]
    pub keys: KeyConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation API configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    // @field: Chat completions URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Max tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature parameter for text generation (0.0 to 2.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How many lines/values are sent in one API request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            batch_size: default_batch_size(),
        }
    }
}

impl TranslationConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry behavior for a single chunk
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryConfig {
    /// Total attempts per chunk, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// Input and output file settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilesConfig {
    /// Inputs larger than this are rejected before parsing
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Persistent log file, truncated at startup
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
            log_file: default_log_file(),
        }
    }
}

/// API key storage settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KeyConfig {
    /// Key file path; empty means the per-user default location
    #[serde(default)]
    pub key_file: String,

    /// Prefixes a key must start with to be accepted
    #[serde(default = "default_accepted_prefixes")]
    pub accepted_prefixes: Vec<String>,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            key_file: String::new(),
            accepted_prefixes: default_accepted_prefixes(),
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
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "Bulgarian".to_string()
}

fn default_endpoint() -> String {
    "https://api.x.ai/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "grok-3".to_string()
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_batch_size() -> usize {
    15
}

fn default_max_attempts() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_max_file_size_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_log_file() -> String {
    "translation_log.txt".to_string()
}

fn default_accepted_prefixes() -> Vec<String> {
    vec!["xai-".to_string(), "xai_".to_string()]
}

impl Config {
    /// Load the configuration from `path`, creating a default file when it does not exist
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
        crate::language_utils::resolve_language_name(&self.target_language)?;

        Url::parse(&self.translation.endpoint)
            .with_context(|| format!("Invalid translation endpoint: {}", self.translation.endpoint))?;

        if self.translation.model.trim().is_empty() {
            return Err(anyhow!("Translation model must not be empty"));
        }
        if self.translation.batch_size == 0 {
            return Err(anyhow!("Batch size must be at least 1"));
        }
        if self.translation.timeout_secs == 0 {
            return Err(anyhow!("Timeout must be at least 1 second"));
        }
        if !(0.0..=2.0).contains(&self.translation.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.translation.temperature
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(anyhow!("Retry max_attempts must be at least 1"));
        }
        if self.keys.accepted_prefixes.is_empty() {
            return Err(anyhow!("At least one accepted API key prefix is required"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            retry: RetryConfig::default(),
            files: FilesConfig::default(),
            keys: KeyConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
