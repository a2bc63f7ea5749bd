//! API configuration

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/vehicle_ledger";

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    /// Directory that uploaded images are written under
    pub media_root: String,
    /// Maximum connections in the database pool
    pub max_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: "info".to_string(),
            media_root: "media".to_string(),
            max_connections: 10,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `APP_`-prefixed environment variables
    ///
    /// A plain `DATABASE_URL` is honoured when `APP_DATABASE_URL` is unset.
    /// Missing variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        Self::from_environment(Environment::with_prefix("APP").try_parsing(true), database_url)
    }

    fn from_environment(env: Environment, database_url: String) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();
        Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_url", database_url)?
            .set_default("log_level", defaults.log_level)?
            .set_default("media_root", defaults.media_root)?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> ApiConfig {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let env = Environment::with_prefix("APP").try_parsing(true).source(Some(source));
        ApiConfig::from_environment(env, DEFAULT_DATABASE_URL.to_string()).unwrap()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = load(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.media_root, "media");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_prefixed_variables_override_defaults() {
        let config = load(&[
            ("APP_PORT", "9090"),
            ("APP_MEDIA_ROOT", "/var/lib/ledger"),
            ("APP_MAX_CONNECTIONS", "25"),
        ]);
        assert_eq!(config.port, 9090);
        assert_eq!(config.media_root, "/var/lib/ledger");
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.log_level, "info");
    }
}
