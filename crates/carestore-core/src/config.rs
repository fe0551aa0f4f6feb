//! Engine configuration.
//!
//! Layers, lowest priority first:
//! 1. compiled defaults ([`EngineConfig::default`])
//! 2. an optional TOML file
//! 3. `CARESTORE_*` environment variables
//!
//! ```toml
//! max_version_depth = 256
//! empty_target_policy = "exclude"
//!
//! [logging]
//! filter = "carestore_core=debug"
//! json = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::EmptyTargetPolicy;

pub const ENV_MAX_VERSION_DEPTH: &str = "CARESTORE_MAX_VERSION_DEPTH";
pub const ENV_EMPTY_TARGET_POLICY: &str = "CARESTORE_EMPTY_TARGET_POLICY";
pub const ENV_LOG: &str = "CARESTORE_LOG";
pub const ENV_LOG_JSON: &str = "CARESTORE_LOG_JSON";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 1 回の event 解決でたどる version 数の上限
    pub max_version_depth: usize,

    /// 期待値のない event を adherence にどう数えるか
    pub empty_target_policy: EmptyTargetPolicy,

    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_version_depth: 1024,
            empty_target_policy: EmptyTargetPolicy::Complete,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// デフォルト → `path`（指定時）→ 環境変数 の順に適用
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(std::env::vars())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// `vars` の `CARESTORE_*` で上書き（他のキーは無視）
    pub fn with_env<I>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                ENV_MAX_VERSION_DEPTH => {
                    self.max_version_depth = value.parse().map_err(|_| ConfigError::InvalidEnv {
                        key: ENV_MAX_VERSION_DEPTH,
                        value: value.clone(),
                    })?;
                }
                ENV_EMPTY_TARGET_POLICY => {
                    self.empty_target_policy = match value.to_ascii_lowercase().as_str() {
                        "complete" => EmptyTargetPolicy::Complete,
                        "exclude" => EmptyTargetPolicy::Exclude,
                        _ => {
                            return Err(ConfigError::InvalidEnv {
                                key: ENV_EMPTY_TARGET_POLICY,
                                value,
                            });
                        }
                    };
                }
                ENV_LOG => self.logging.filter = value,
                ENV_LOG_JSON => {
                    self.logging.json = match value.as_str() {
                        "1" | "true" => true,
                        "0" | "false" => false,
                        _ => {
                            return Err(ConfigError::InvalidEnv {
                                key: ENV_LOG_JSON,
                                value,
                            });
                        }
                    };
                }
                _ => {}
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_are_reasonable() {
        let config = EngineConfig::default();
        assert_eq!(config.max_version_depth, 1024);
        assert_eq!(config.empty_target_policy, EmptyTargetPolicy::Complete);
        assert_eq!(config.logging.filter, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn toml_overrides_only_given_fields() {
        let config = EngineConfig::from_toml(
            r#"
            empty_target_policy = "exclude"

            [logging]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.empty_target_policy, EmptyTargetPolicy::Exclude);
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.max_version_depth, 1024);
    }

    #[test]
    fn env_overrides_file_values() {
        let config = EngineConfig::from_toml("max_version_depth = 8")
            .unwrap()
            .with_env(vars(&[
                (ENV_MAX_VERSION_DEPTH, "16"),
                (ENV_EMPTY_TARGET_POLICY, "Exclude"),
                (ENV_LOG, "debug"),
                ("UNRELATED", "x"),
            ]))
            .unwrap();

        assert_eq!(config.max_version_depth, 16);
        assert_eq!(config.empty_target_policy, EmptyTargetPolicy::Exclude);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let err = EngineConfig::default()
            .with_env(vars(&[(ENV_MAX_VERSION_DEPTH, "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: ENV_MAX_VERSION_DEPTH, .. }));

        let err = EngineConfig::default()
            .with_env(vars(&[(ENV_LOG_JSON, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: ENV_LOG_JSON, .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_toml("max_version_depth = \"deep\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
