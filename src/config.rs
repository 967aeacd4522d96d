//! Configuration
//!
//! Read from the environment (and a `.env` file when present).

use thiserror::Error;

const LOG_FILTER_KEY: &str = "ANNOTATIONS_LOG";
const GROUP_DOC_METAS_KEY: &str = "ANNOTATIONS_GROUP_DOC_METAS";

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid boolean for {key}: {value}")]
    InvalidBool { key: &'static str, value: String },
}

/// Sidebar configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Also listen to doc metas shared through groups (signed-in users only)
    pub group_doc_metas: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "doc_annotations=debug".to_string(),
            group_doc_metas: true,
        }
    }
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load `.env`, then the environment, falling back to defaults on error
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from env: {}, using defaults", e);
            Config::default()
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let log_filter = lookup(LOG_FILTER_KEY)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        let group_doc_metas = match lookup(GROUP_DOC_METAS_KEY) {
            Some(value) => parse_bool(GROUP_DOC_METAS_KEY, &value)?,
            None => defaults.group_doc_metas,
        };

        Ok(Self {
            log_filter,
            group_doc_metas,
        })
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ANNOTATIONS_LOG", "doc_annotations=trace"),
            ("ANNOTATIONS_GROUP_DOC_METAS", "off"),
        ]))
        .unwrap();

        assert_eq!(config.log_filter, "doc_annotations=trace");
        assert!(!config.group_doc_metas);
    }

    #[test]
    fn test_blank_filter_uses_default() {
        let config = Config::from_lookup(lookup(&[("ANNOTATIONS_LOG", "  ")])).unwrap();
        assert_eq!(config.log_filter, "doc_annotations=debug");
    }

    #[test]
    fn test_invalid_bool() {
        let err = Config::from_lookup(lookup(&[("ANNOTATIONS_GROUP_DOC_METAS", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { key: "ANNOTATIONS_GROUP_DOC_METAS", .. }));
    }
}
