//! Service configuration
//!
//! Loads the password policy and breach check settings from a YAML file.
//! Both are read once at startup and never mutated afterwards.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Environment variable holding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "PWD_GUARD_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
const DEFAULT_RANGE_URL: &str = "https://api.pwnedpasswords.com/range/";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read configuration file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Top level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub password: PolicyConfig,
    #[serde(default)]
    pub pwned: BreachCheckConfig,
}

/// Composition rules applied to every candidate password.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub length: LengthRule,
    pub case: CaseRule,
    pub symbols: SymbolRule,
    pub numbers: NumericRule,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LengthRule {
    pub enabled: bool,
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaseRule {
    pub enabled: bool,
    pub only_upper: bool,
    pub only_lower: bool,
    pub min_upper: usize,
    pub min_lower: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SymbolRule {
    pub enabled: bool,
    pub allow_symbols: bool,
    pub min: usize,
    #[serde(deserialize_with = "char_set")]
    pub allowed_symbols: BTreeSet<char>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumericRule {
    pub enabled: bool,
    pub allow_numbers: bool,
    pub min: usize,
    pub only_numbers: bool,
}

/// Settings for the remote breach corpus lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BreachCheckConfig {
    pub enabled: bool,
    #[serde(rename = "timeoutSeconds", deserialize_with = "seconds")]
    pub timeout: Duration,
    pub url: String,
}

impl Default for BreachCheckConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            url: DEFAULT_RANGE_URL.to_string(),
        }
    }
}

fn char_set<'de, D>(deserializer: D) -> Result<BTreeSet<char>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.chars().collect())
}

fn seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

impl SymbolRule {
    /// Renders the allowed set back into a string for user-facing messages.
    pub fn allowed_display(&self) -> String {
        self.allowed_symbols.iter().collect()
    }
}

impl ServiceConfig {
    /// Parses and validates a configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration document from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File does not exist
    /// - File cannot be read
    /// - The YAML is malformed or describes an impossible policy
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            #[cfg(feature = "tracing")]
            tracing::error!("Configuration loading FAILED: FileNotFound {:?}", path);
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Configuration loaded from {:?} (breach check enabled: {})",
            path,
            config.pwned.enabled
        );

        Ok(config)
    }

    /// Loads the configuration from the path in `PWD_GUARD_CONFIG`,
    /// falling back to `./config.yaml`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_path(config_path())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let length = &self.password.length;
        if length.enabled && length.min > length.max {
            return Err(ConfigError::Invalid(format!(
                "length.min ({}) is greater than length.max ({})",
                length.min, length.max
            )));
        }

        if self.pwned.enabled {
            if self.pwned.url.trim().is_empty() {
                return Err(ConfigError::Invalid("pwned.url must not be empty".to_string()));
            }
            if self.pwned.timeout.is_zero() {
                return Err(ConfigError::Invalid(
                    "pwned.timeoutSeconds must be greater than zero".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Returns the configuration file path.
///
/// Priority:
/// 1. Environment variable `PWD_GUARD_CONFIG`
/// 2. Default path `./config.yaml`
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
