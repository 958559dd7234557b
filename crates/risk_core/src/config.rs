//! Configuration for the credit risk predictor
//!
//! Loaded once at startup from TOML, then overridden from the environment.
//! The resulting value is immutable for the life of the process.

use crate::errors::{Result, RiskCoreError};
use crate::schema::FeatureLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding `model.path`
pub const ENV_MODEL_PATH: &str = "CREDIT_RISK_MODEL_PATH";
/// Environment variable overriding `model.expected_hash`
pub const ENV_MODEL_HASH: &str = "CREDIT_RISK_MODEL_HASH";
/// Environment variable overriding `features.layout`
pub const ENV_LAYOUT: &str = "CREDIT_RISK_LAYOUT";
/// Environment variable overriding `logging.level`
pub const ENV_LOG_LEVEL: &str = "CREDIT_RISK_LOG_LEVEL";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    pub model: ModelConfig,
    pub features: FeaturesConfig,
    pub logging: LoggingConfig,
}

/// Classifier artifact settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ensemble artifact
    pub path: PathBuf,
    /// Pinned canonical hash (hex); loading fails on mismatch
    pub expected_hash: Option<String>,
    /// Reject rows whose layout differs from the declared training schema
    pub enforce_schema: bool,
}

/// Row layout selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutSetting {
    /// Pick the layout matching the classifier's declared feature names
    #[default]
    Auto,
    Engineered,
    Base,
}

impl LayoutSetting {
    /// Fixed layout, if one is forced
    pub fn fixed(self) -> Option<FeatureLayout> {
        match self {
            LayoutSetting::Auto => None,
            LayoutSetting::Engineered => Some(FeatureLayout::Engineered),
            LayoutSetting::Base => Some(FeatureLayout::Base),
        }
    }
}

impl std::str::FromStr for LayoutSetting {
    type Err = RiskCoreError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(LayoutSetting::Auto);
        }
        Ok(match s.parse::<FeatureLayout>()? {
            FeatureLayout::Engineered => LayoutSetting::Engineered,
            FeatureLayout::Base => LayoutSetting::Base,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FeaturesConfig {
    pub layout: LayoutSetting,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    pub format: LogFormat,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/credit_default.json"),
            expected_hash: None,
            enforce_schema: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl RiskConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            RiskCoreError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: RiskConfig = toml::from_str(&content)
            .map_err(|e| RiskCoreError::Config(format!("Failed to parse config: {e}")))?;

        Ok(config)
    }

    /// Write configuration as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RiskCoreError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from process environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_MODEL_PATH) {
            self.model.path = PathBuf::from(path);
        }
        if let Some(hash) = lookup(ENV_MODEL_HASH) {
            self.model.expected_hash = if hash.is_empty() { None } else { Some(hash) };
        }
        if let Some(layout) = lookup(ENV_LAYOUT) {
            self.features.layout = layout.parse()?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Problems that make this configuration unusable
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.model.path.as_os_str().is_empty() {
            issues.push("model.path must not be empty".to_string());
        }

        if let Some(hash) = &self.model.expected_hash {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                issues.push(format!(
                    "model.expected_hash must be 64 hex characters, got {hash:?}"
                ));
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            issues.push(format!("Unknown logging.level: {}", self.logging.level));
        }

        if !self.model.enforce_schema {
            warn!("Schema enforcement disabled; row/classifier mismatches go undetected");
        }

        issues
    }

    /// Fail on the first validation issue
    pub fn ensure_valid(&self) -> Result<()> {
        match self.validate().into_iter().next() {
            Some(issue) => Err(RiskCoreError::Config(issue)),
            None => Ok(()),
        }
    }
}
