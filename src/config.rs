//! Configuration loading.
//!
//! Layers an optional TOML file under `KEYTREE_`-prefixed environment
//! variables (`KEYTREE_ENDPOINT`, `KEYTREE_TOKEN`,
//! `KEYTREE_LOGGING__LEVEL`, ...). An explicit `--config` path is required to
//! exist; the default platform location is used only when present.

use crate::error::ExplorerError;
use crate::logging::LoggingConfig;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Base URL of the store API, e.g. `https://store.example.com/api`.
    pub endpoint: String,

    /// Bearer token for mutating calls. Reads work without one.
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout handed to the HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Re-list affected directories after successful mutations.
    #[serde(default)]
    pub relist_after_mutation: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ExplorerConfig {
    /// Load configuration with precedence: environment over file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ExplorerError> {
        let mut builder = Config::builder();
        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path.to_path_buf()));
            }
            None => {
                if let Some(default) = Self::default_path() {
                    if default.exists() {
                        builder = builder.add_source(File::from(default));
                    }
                }
            }
        }
        builder = builder.add_source(Environment::with_prefix("KEYTREE").separator("__"));

        let config: Self = builder
            .build()
            .map_err(|e| ExplorerError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ExplorerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Platform config location, e.g. `~/.config/keytree/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "keytree", "keytree")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ExplorerError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ExplorerError::Config(
                "endpoint must be set (KEYTREE_ENDPOINT or the config file)".to_string(),
            ));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ExplorerError::Config(format!(
                "endpoint must include an http(s) scheme: {}",
                endpoint
            )));
        }
        let authority = endpoint
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or_default()
            .split('/')
            .next()
            .unwrap_or_default();
        if authority.is_empty() || authority.chars().any(char::is_whitespace) {
            return Err(ExplorerError::Config(format!(
                "endpoint has no valid host: {}",
                endpoint
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ExplorerError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_with_endpoint(endpoint: &str) -> ExplorerConfig {
        ExplorerConfig {
            endpoint: endpoint.to_string(),
            token: None,
            request_timeout_secs: 30,
            relist_after_mutation: false,
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
endpoint = "https://store.example.com/api"
token = "t0ken"
relist_after_mutation = true

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = ExplorerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.endpoint, "https://store.example.com/api");
        assert_eq!(config.token.as_deref(), Some("t0ken"));
        assert!(config.relist_after_mutation);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope.toml");
        assert!(matches!(
            ExplorerConfig::load(Some(&path)),
            Err(ExplorerError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_endpoints() {
        assert!(config_with_endpoint("").validate().is_err());
        assert!(config_with_endpoint("store.example.com").validate().is_err());
        assert!(config_with_endpoint("https://").validate().is_err());
        assert!(config_with_endpoint("https://store.example.com")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = config_with_endpoint("https://store.example.com");
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
