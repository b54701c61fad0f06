//! Client configuration

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Storage key for the short-lived access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Storage key for the JSON user-info blob shown by the navigation shell
pub const USER_INFO_KEY: &str = "user_info";

/// Settings for talking to the booking backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base endpoint every request path is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Path of the token refresh endpoint
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Delay before redirecting to login after a failed refresh
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
    /// Directory holding persisted credentials and logs
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:3005".to_string()
}

const fn default_timeout_ms() -> u64 {
    3000
}

fn default_refresh_path() -> String {
    "/user/admin/refresh".to_string()
}

const fn default_redirect_delay_ms() -> u64 {
    1500
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            refresh_path: default_refresh_path(),
            redirect_delay_ms: default_redirect_delay_ms(),
            data_dir: None,
        }
    }
}

impl ClientSettings {
    /// Load settings from the usual config file locations and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load settings, optionally from an explicit file.
    ///
    /// Sources are layered: defaults, then the file (explicit path or the first
    /// of `roombook.toml` / `config/roombook.toml` that exists), then
    /// `ROOMBOOK__*` environment variables.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        } else {
            for candidate in ["roombook.toml", "config/roombook.toml"] {
                if Path::new(candidate).exists() {
                    builder = builder.add_source(File::with_name(candidate).required(false));
                    break;
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("ROOMBOOK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        validators::validate_url(&self.base_url, "base_url")?;
        validators::validate_path(&self.refresh_path, "refresh_path")?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "timeout_ms: must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub const fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// Data directory, falling back to the platform data dir
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("roombook")
        })
    }

    /// File the persisted credential store lives in
    pub fn credentials_file(&self) -> PathBuf {
        self.data_dir().join("storage.json")
    }
}

mod validators {
    use config::ConfigError;

    pub fn validate_url(url: &str, field: &str) -> Result<(), ConfigError> {
        if url.trim().is_empty() {
            return Err(ConfigError::Message(format!("{field}: cannot be empty")));
        }
        url::Url::parse(url)
            .map_err(|e| ConfigError::Message(format!("{field}: invalid URL - {e}")))?;
        Ok(())
    }

    pub fn validate_path(path: &str, field: &str) -> Result<(), ConfigError> {
        if !path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "{field}: must start with '/'"
            )));
        }
        Ok(())
    }
}
