//! Configuration loading for the Shipline client.
//!
//! The file is optional. Without `--config` or `SHIPLINE_CONFIG` the
//! defaults below are used; every field in a file may be omitted.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://localhost:5000/api";
pub const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "LogisticApp/1.0";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub auth: AuthConfig,
    pub cache: CacheSettings,
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AuthConfig {
    /// Sent as `Authorization: Bearer ...` in addition to the session cookie.
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CacheSettings {
    pub ttl_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GeocodingConfig {
    pub nominatim_base_url: String,
    pub user_agent: String,
    /// Minimum spacing between Nominatim requests.
    pub min_interval_ms: u64,
    pub mapbox_api_key: Option<String>,
    pub locationiq_api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: 10_000,
            auth: AuthConfig::default(),
            cache: CacheSettings::default(),
            geocoding: GeocodingConfig::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl_ms: 30_000 }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            nominatim_base_url: DEFAULT_NOMINATIM_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_interval_ms: 1_000,
            mapbox_api_key: None,
            locationiq_api_key: None,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl GeocodingConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    /// Load from `path` when given, otherwise use defaults. The result is
    /// validated either way.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must be an http(s) URL".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.cache.ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.ttl_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if matches!(&self.auth.bearer_token, Some(token) if token.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "auth.bearer_token",
                reason: "must not be blank when set".to_string(),
            });
        }
        if self.geocoding.nominatim_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "geocoding.nominatim_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.geocoding.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "geocoding.user_agent",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_base_url, "https://localhost:5000/api");
        assert_eq!(config.cache.ttl(), Duration::from_secs(30));
        assert_eq!(config.geocoding.min_interval(), Duration::from_secs(1));
        assert_eq!(config.geocoding.user_agent, "LogisticApp/1.0");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ClientConfig::from_toml(
            r#"
            api_base_url = "http://127.0.0.1:8080/api"

            [cache]
            ttl_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8080/api");
        assert_eq!(config.cache.ttl_ms, 5000);
        assert_eq!(config.request_timeout_ms, 10_000);
        assert!(config.geocoding.mapbox_api_key.is_none());
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        let config = ClientConfig::load(None).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_load_validates_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipline.toml");
        std::fs::write(&path, "request_timeout_ms = 0\n").unwrap();
        assert!(matches!(
            ClientConfig::load(Some(&path)),
            Err(ConfigError::InvalidValue { field: "request_timeout_ms", .. })
        ));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = ClientConfig::from_toml("tenant_id = 'x'").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_ttl_is_invalid() {
        let mut config = ClientConfig::default();
        config.cache.ttl_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "cache.ttl_ms", .. })
        ));
    }

    #[test]
    fn test_blank_bearer_token_is_invalid() {
        let mut config = ClientConfig::default();
        config.auth.bearer_token = Some("  ".to_string());
        assert!(config.validate().is_err());
    }
}
