//! Client configuration
//!
//! Values come from built-in defaults, an optional config file and then
//! `LAVACAR_*` environment variables, later sources winning.

use crate::error::{CoreError, CoreResult};
use crate::validation::{ValidationErrors, validators};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment prefix, e.g. `LAVACAR_API_URL`
pub const ENV_PREFIX: &str = "LAVACAR";

/// How a client coordinates `401` responses that overlap a token refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Requests arriving while a refresh is running wait for it and retry
    #[default]
    Shared,
    /// Requests arriving while a refresh is running fail with their `401`
    RejectConcurrent,
}

/// API client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST API
    pub api_url: String,

    /// Base URL of the object storage bucket used for uploads
    pub storage_url: String,

    /// Request timeout in seconds, transport default when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User agent sent with every request
    pub user_agent: String,

    /// Concurrent refresh policy
    #[serde(default)]
    pub refresh_mode: RefreshMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3333".to_string(),
            storage_url: "http://localhost:9000/lavacar".to_string(),
            timeout_secs: None,
            user_agent: concat!("lavacar-client/", env!("CARGO_PKG_VERSION")).to_string(),
            refresh_mode: RefreshMode::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed or the
    /// result fails validation
    pub fn from_env() -> CoreResult<Self> {
        Self::load(None)
    }

    /// Load configuration from file, environment variables still override it
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Load from an optional file, then the environment
    ///
    /// # Errors
    ///
    /// Returns an error if any source fails to parse or validation fails
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("storage_url", defaults.storage_url)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("refresh_mode", "shared")?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check URLs and limits
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] listing every problem found
    pub fn validate(&self) -> CoreResult<()> {
        let mut errors = ValidationErrors::new();
        errors
            .check(validators::validate_url(&self.api_url, "api_url"))
            .check(validators::validate_url(&self.storage_url, "storage_url"))
            .check(validators::validate_not_empty(&self.user_agent, "user_agent"));
        if let Some(timeout) = self.timeout_secs {
            errors.check(validators::validate_range(timeout, 1, 600, "timeout_secs"));
        }
        errors
            .into_result()
            .map_err(|e| CoreError::invalid_config(e.to_string()))
    }

    /// API base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Public URL of an object in the storage bucket
    pub fn storage_object_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.storage_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.refresh_mode, RefreshMode::Shared);
    }

    #[test]
    fn invalid_values_are_reported_together() {
        let config = ClientConfig {
            api_url: "nope".into(),
            user_agent: String::new(),
            timeout_secs: Some(0),
            ..ClientConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("api_url"));
        assert!(err.contains("user_agent"));
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn loads_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
api_url = "https://api.uauclubelavacar.com.br/"
storage_url = "https://bucket.uauclubelavacar.com.br"
timeout_secs = 15
refresh_mode = "reject_concurrent"
"#
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_base(), "https://api.uauclubelavacar.com.br");
        assert_eq!(config.timeout_secs, Some(15));
        assert_eq!(config.refresh_mode, RefreshMode::RejectConcurrent);
        assert_eq!(
            config.storage_object_url("/vehicles/abc.jpg"),
            "https://bucket.uauclubelavacar.com.br/vehicles/abc.jpg"
        );
    }

    #[test]
    fn rejects_bad_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "api_url = \"::::\"").unwrap();
        assert!(matches!(
            ClientConfig::from_file(file.path()),
            Err(CoreError::InvalidConfig { .. })
        ));
    }
}
