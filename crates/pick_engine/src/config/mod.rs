//! Configuration system

pub use serde::{Serialize, Deserialize};

use std::path::Path;
use std::time::Duration;

/// On-disk document format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format for `path`, or `UnsupportedFormat` for any other extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Serde-backed settings stored as TOML or RON
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Parse a document in the given format
    fn from_str_as(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Render as a document in the given format
    fn to_string_as(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Load from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_as(&contents, format)
    }

    /// Save to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.to_string_as(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Value out of range
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Default per-frame evaluation budget: 2 ms
pub const DEFAULT_PER_FRAME_TIME_BUDGET_USECS: u32 = 2_000;

/// Upper bound on a sane budget: one full second per frame
const MAX_PER_FRAME_TIME_BUDGET_USECS: u32 = 1_000_000;

/// # Pick Manager Configuration
///
/// Manager-level settings loaded at startup by the frame-loop driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickManagerConfig {
    /// Deadline for one evaluation pass in microseconds (0 = unbounded)
    pub per_frame_time_budget_usecs: u32,
    /// Default log filter for the driver
    pub log_level: String,
}

impl PickManagerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            per_frame_time_budget_usecs: DEFAULT_PER_FRAME_TIME_BUDGET_USECS,
            log_level: "info".to_string(),
        }
    }

    /// Set the per-frame budget
    pub fn with_budget_usecs(mut self, usecs: u32) -> Self {
        self.per_frame_time_budget_usecs = usecs;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Budget as a duration, `None` when unbounded
    pub fn budget(&self) -> Option<Duration> {
        (self.per_frame_time_budget_usecs > 0)
            .then(|| Duration::from_micros(u64::from(self.per_frame_time_budget_usecs)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_frame_time_budget_usecs > MAX_PER_FRAME_TIME_BUDGET_USECS {
            return Err(ConfigError::Invalid(format!(
                "per-frame budget of {}us exceeds {}us",
                self.per_frame_time_budget_usecs, MAX_PER_FRAME_TIME_BUDGET_USECS
            )));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log level cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for PickManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for PickManagerConfig {}
