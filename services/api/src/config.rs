//! Service configuration
//!
//! Values come from built-in defaults overridden by `MUSICA_*` environment
//! variables (`MUSICA_HOST`, `MUSICA_PORT`, `MUSICA_DEFAULT_PAGE_SIZE`,
//! `MUSICA_MAX_PAGE_SIZE`).

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Runtime configuration of the catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Page size used when a listing omits `limit`
    pub default_page_size: i64,
    /// Upper bound applied to every `limit`
    pub max_page_size: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Load the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("default_page_size", DEFAULT_PAGE_SIZE)?
            .set_default("max_page_size", MAX_PAGE_SIZE)?
            .add_source(Environment::with_prefix("MUSICA"))
            .build()?
            .try_deserialize()?;

        if config.max_page_size < 1 {
            return Err(ConfigError::Message(
                "MUSICA_MAX_PAGE_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    /// `host:port` to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Public base URL of the service
    pub fn base_url(&self) -> String {
        format!("http://{}", self.bind_addr())
    }
}
