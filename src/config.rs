//! Application settings
//!
//! Settings are read, lowest priority first, from built-in defaults, an
//! optional `config/default` file and `CAMPUS_FEED__*` environment variables
//! (`CAMPUS_FEED__BACKEND__URL` sets `backend.url`). A `.env` file is loaded
//! into the environment first when present.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use app_core::auth::DEFAULT_EMAIL_DOMAIN;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CAMPUS_FEED";

/// Root configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Backend data service
    pub backend: BackendSettings,

    /// Authentication rules
    pub auth: AuthSettings,
}

/// Backend data service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    /// Deployment URL
    pub url: String,

    /// Timeout for function calls in seconds
    pub request_timeout_secs: u64,

    /// Timeout for one image transfer in seconds
    pub upload_timeout_secs: u64,

    /// Network retries for the feed query
    pub feed_retries: usize,
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Email suffix allowed to sign in and sign up, including the `@`
    pub allowed_email_domain: String,
}

impl BackendSettings {
    /// Function call timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Image transfer timeout
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl Settings {
    /// Load settings from `.env`, `config/default` and the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed, `backend.url` is
    /// missing, or a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    /// Load settings from a specific file plus the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from(path.as_ref()).required(true))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("backend.request_timeout_secs", 30_u64)?
            .set_default("backend.upload_timeout_secs", 120_u64)?
            .set_default("backend.feed_retries", 2_u64)?
            .set_default("auth.allowed_email_domain", DEFAULT_EMAIL_DOMAIN)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    fn validate(settings: Self) -> Result<Self, ConfigError> {
        if settings.backend.url.trim().is_empty() {
            return Err(ConfigError::Message("backend.url must not be empty".to_string()));
        }
        if !settings.auth.allowed_email_domain.starts_with('@') {
            return Err(ConfigError::Message(format!(
                "auth.allowed_email_domain must start with '@', got {:?}",
                settings.auth.allowed_email_domain
            )));
        }
        if settings.backend.upload_timeout_secs == 0 || settings.backend.request_timeout_secs == 0 {
            return Err(ConfigError::Message("timeouts must be at least one second".to_string()));
        }
        Ok(settings)
    }
}
