use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite:larder.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from an optional TOML file plus `LARDER_*`
    /// environment overrides (e.g. `LARDER_DATABASE__URL`).
    pub fn load(path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = match path {
            Some(path) => builder.add_source(File::with_name(&path)),
            None => builder.add_source(File::with_name("larder").required(false)),
        };

        builder
            .add_source(Environment::with_prefix("LARDER").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.is_empty() {
            return Err("database.url must not be empty".to_string());
        }

        if self.database.max_connections == 0 {
            return Err("database.max_connections must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config {
            database: DatabaseConfig::default(),
            observability: ObservabilityConfig::default(),
        };

        assert!(config.validate().is_ok());
        assert_eq!(config.database.url, "sqlite:larder.db");
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let config = Config {
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 5,
            },
            observability: ObservabilityConfig::default(),
        };

        assert!(config.validate().is_err());
    }
}
