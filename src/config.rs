//! Application configuration.
//!
//! All configuration is loaded from environment variables at startup. A
//! `.env` file in the working directory is honored for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

use crate::analysis::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::photo::PhotoSettings;

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Vision service credential; analysis fails fast without it
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_endpoint: String,
    /// Overrides the default database location
    pub db_path: Option<PathBuf>,
    pub log_level: Level,
    pub photo: PhotoSettings,
    /// Caller-side bound on a single analysis call
    pub analysis_timeout: Option<Duration>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// The `.env` file is skipped in test builds so tests stay hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key → value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .filter(|key| !key.trim().is_empty());

        let gemini_model = lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let gemini_endpoint =
            lookup("GEMINI_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let db_path = lookup("XMU_CATS_DB").map(PathBuf::from);

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let defaults = PhotoSettings::default();
        let max_dimension = match lookup("PHOTO_MAX_DIMENSION") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or_else(|| invalid("PHOTO_MAX_DIMENSION", &raw))?,
            None => defaults.max_dimension,
        };
        let quality = match lookup("PHOTO_QUALITY") {
            Some(raw) => raw
                .parse::<f32>()
                .ok()
                .filter(|q| *q > 0.0 && *q <= 1.0)
                .ok_or_else(|| invalid("PHOTO_QUALITY", &raw))?,
            None => defaults.quality,
        };

        let analysis_timeout = match lookup("ANALYSIS_TIMEOUT_SECS") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .ok()
                    .filter(|s| *s > 0)
                    .map(Duration::from_secs)
                    .ok_or_else(|| invalid("ANALYSIS_TIMEOUT_SECS", &raw))?,
            ),
            None => None,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model,
            gemini_endpoint,
            db_path,
            log_level,
            photo: PhotoSettings {
                max_dimension,
                quality,
            },
            analysis_timeout,
        })
    }
}

fn invalid(key: &str, raw: &str) -> ConfigError {
    ConfigError::InvalidValue(key.to_string(), format!("'{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.gemini_model, DEFAULT_MODEL);
        assert_eq!(config.gemini_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.db_path, None);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.photo, PhotoSettings::default());
        assert_eq!(config.analysis_timeout, None);
    }

    #[test]
    fn test_api_key_fallback() {
        let config = load(&[("API_KEY", "legacy")]).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("legacy"));

        let config = load(&[("API_KEY", "legacy"), ("GEMINI_API_KEY", "primary")]).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = load(&[("GEMINI_API_KEY", "")]).unwrap();
        assert_eq!(config.gemini_api_key, None);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("XMU_CATS_DB", "/tmp/cats.db"),
            ("RUST_LOG", "debug"),
            ("PHOTO_MAX_DIMENSION", "1024"),
            ("PHOTO_QUALITY", "0.6"),
            ("ANALYSIS_TIMEOUT_SECS", "45"),
        ])
        .unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/cats.db")));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.photo.max_dimension, 1024);
        assert_eq!(config.photo.quality, 0.6);
        assert_eq!(config.analysis_timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("PHOTO_QUALITY", "1.5")]),
            Err(ConfigError::InvalidValue(key, _)) if key == "PHOTO_QUALITY"
        ));
        assert!(load(&[("PHOTO_MAX_DIMENSION", "0")]).is_err());
        assert!(load(&[("ANALYSIS_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("RUST_LOG", "chatty")]).is_err());
    }
}
