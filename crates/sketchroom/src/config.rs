//! Server configuration.
//!
//! Loaded from environment variables, all optional.

use std::collections::HashMap;
use std::env;

use sketchroom_room::GameConfig;
use thiserror::Error;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default listen host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default round length in seconds.
pub const DEFAULT_ROUND_SECONDS: u32 = 80;

/// Log filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "sketchroom=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interface to listen on (`HOST`, default `0.0.0.0`).
    pub host: String,

    /// Port to listen on (`PORT`, default 3000).
    pub port: u16,

    /// Round length in seconds (`ROUND_SECONDS`, default 80).
    pub round_seconds: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let host = vars
            .get("HOST")
            .cloned()
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match vars.get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::InvalidValue(format!("PORT={raw:?}: {e}"))
            })?,
            None => DEFAULT_PORT,
        };

        let round_seconds = match vars.get("ROUND_SECONDS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u32>().map_err(|e| {
                    ConfigError::InvalidValue(format!("ROUND_SECONDS={raw:?}: {e}"))
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue(
                        "ROUND_SECONDS must be greater than zero".to_string(),
                    ));
                }
                secs
            }
            None => DEFAULT_ROUND_SECONDS,
        };

        Ok(Config {
            host,
            port,
            round_seconds,
        })
    }

    /// `host:port`, ready for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Game settings for every room this server opens.
    pub fn game_config(&self) -> GameConfig {
        GameConfig::with_round_secs(self.round_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            round_seconds: DEFAULT_ROUND_SECONDS,
        }
    }
}
