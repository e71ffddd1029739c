use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Options the credential service is constructed with.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub signing_secret: String,

    /// Access token lifetime, e.g. "24h" (falls back to 24h if unparsable)
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl: String,

    /// Refresh token lifetime, e.g. "7d" (falls back to 7d if unparsable)
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl: String,

    /// bcrypt work factor, 4..=31
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,

    /// Not enforced by the service; read by the rate-limiting layer in front of it
    #[serde(default = "default_request_rate_limit_per_minute")]
    pub request_rate_limit_per_minute: u32,

    /// When false, new users are marked verified at registration
    #[serde(default)]
    pub require_email_verification: bool,
}

impl AuthConfig {
    /// Configuration with every option at its default except the secret.
    pub fn with_secret(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            access_token_ttl: default_access_token_ttl(),
            refresh_token_ttl: default_refresh_token_ttl(),
            hash_cost: default_hash_cost(),
            request_rate_limit_per_minute: default_request_rate_limit_per_minute(),
            require_email_verification: false,
        }
    }
}

fn default_access_token_ttl() -> String {
    "24h".to_string()
}

fn default_refresh_token_ttl() -> String {
    "7d".to_string()
}

fn default_hash_cost() -> u32 {
    12
}

fn default_request_rate_limit_per_minute() -> u32 {
    60
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__SIGNING_SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: AUTH__SIGNING_SECRET=... overrides auth.signing_secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
