//! # configs
//!
//! Layered settings for the forum server: built-in defaults, then
//! `config/default.toml`, then `config/{QA_ENV}.toml`, then `QA__*`
//! environment variables (`QA__SERVER__PORT=9000`). A `.env` file is loaded
//! into the environment first when present.

use std::collections::HashMap;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub hub: HubSettings,
    pub log: LogSettings,
    #[serde(default)]
    pub cors: CorsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    /// Events buffered per subscriber before a slow one starts skipping.
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsSettings {
    /// `None` allows any origin.
    pub allowed_origin: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let env = std::env::var("QA_ENV").unwrap_or_else(|_| "development".into());
        Self::build(&env, None)
    }

    /// Builds settings from the layered sources. `env_override` replaces the
    /// process environment as the source of `QA__*` variables.
    pub fn build(
        env: &str,
        env_override: Option<HashMap<String, String>>,
    ) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("hub.capacity", 256)?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                Environment::with_prefix("QA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env_override),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_sources() {
        let settings = Settings::build("test", Some(HashMap::new())).unwrap();
        assert_eq!(settings.server.address(), "127.0.0.1:8000");
        assert_eq!(settings.hub.capacity, 256);
        assert_eq!(settings.log.level, "info");
        assert!(!settings.log.json);
        assert!(settings.cors.allowed_origin.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let vars = HashMap::from([
            ("QA__SERVER__PORT".to_string(), "9100".to_string()),
            ("QA__HUB__CAPACITY".to_string(), "32".to_string()),
            ("QA__LOG__JSON".to_string(), "true".to_string()),
            ("QA__CORS__ALLOWED_ORIGIN".to_string(), "http://localhost:3000".to_string()),
        ]);
        let settings = Settings::build("test", Some(vars)).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.hub.capacity, 32);
        assert!(settings.log.json);
        assert_eq!(
            settings.cors.allowed_origin.as_deref(),
            Some("http://localhost:3000")
        );
    }

    #[test]
    fn cors_section_is_optional() {
        let vars = HashMap::from([("QA__SERVER__HOST".to_string(), "0.0.0.0".to_string())]);
        let settings = Settings::build("test", Some(vars)).unwrap();
        assert_eq!(settings.server.address(), "0.0.0.0:8000");
        assert!(settings.cors.allowed_origin.is_none());
    }
}
