//! Pipeline configuration.
//!
//! Configuration is loaded from environment variables:
//!
//! - `TALLY_ATTRIBUTE_KEY`: attribute key to resolve and count
//!   (default: `service.name`)
//! - `TALLY_WINDOW_MS`: counting window length in milliseconds
//!   (default: 10000)
//! - `TALLY_DEBUG`: enable verbose logging and the console report table
//!   (default: false)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Configuration errors surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The attribute key resolved to an empty string.
    EmptyAttributeKey,
    /// The window duration resolved to zero.
    ZeroWindow,
    /// `TALLY_WINDOW_MS` was set but not a number.
    InvalidWindowMs(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyAttributeKey => write!(f, "attribute key must not be empty"),
            ConfigError::ZeroWindow => write!(f, "window duration must be positive"),
            ConfigError::InvalidWindowMs(raw) => {
                write!(f, "invalid TALLY_WINDOW_MS value: {:?}", raw)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration for the tally pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Attribute key resolved for every entry
    pub attribute_key: String,
    /// Length of one counting window
    #[serde(with = "duration_millis")]
    pub window_duration: Duration,
    /// Verbose logging plus the console report table
    pub debug: bool,
}

impl Default for TallyConfig {
    fn default() -> Self {
        TallyConfig {
            attribute_key: "service.name".to_string(),
            window_duration: Duration::from_secs(10),
            debug: false,
        }
    }
}

impl TallyConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = TallyConfig::default();

        if let Ok(key) = std::env::var("TALLY_ATTRIBUTE_KEY") {
            config.attribute_key = key;
        }
        if let Ok(raw) = std::env::var("TALLY_WINDOW_MS") {
            let millis: u64 = raw
                .parse()
                .map_err(|_| ConfigError::InvalidWindowMs(raw.clone()))?;
            config.window_duration = Duration::from_millis(millis);
        }
        config.debug = std::env::var("TALLY_DEBUG")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        config.validate()?;
        Ok(config)
    }

    /// Configuration for testing (short windows, table rendering off)
    pub fn test() -> Self {
        TallyConfig {
            attribute_key: "service.name".to_string(),
            window_duration: Duration::from_millis(100),
            debug: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attribute_key.is_empty() {
            return Err(ConfigError::EmptyAttributeKey);
        }
        if self.window_duration.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(())
    }
}

/// Serde helper for Duration as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TallyConfig::default();
        assert_eq!(config.attribute_key, "service.name");
        assert_eq!(config.window_duration, Duration::from_secs(10));
        assert!(!config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config() {
        let config = TallyConfig::test();
        assert_eq!(config.window_duration, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let config = TallyConfig {
            attribute_key: String::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyAttributeKey));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let config = TallyConfig {
            window_duration: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWindow));
    }

    #[test]
    fn test_config_serialization() {
        let config = TallyConfig::test();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: TallyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConfigError::EmptyAttributeKey.to_string(),
            "attribute key must not be empty"
        );
        assert!(ConfigError::InvalidWindowMs("abc".to_string())
            .to_string()
            .contains("abc"));
    }
}
