use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::Arc;

/// Environment variable overriding [`RestConfig::host`]
pub const REST_HOST_VAR: &str = "STRATUM_REST_HOST";
/// Environment variable overriding [`RestConfig::port`]
pub const REST_PORT_VAR: &str = "STRATUM_REST_PORT";
/// Environment variable overriding [`ApplicationConfig::name`]
pub const APP_NAME_VAR: &str = "STRATUM_APP_NAME";

/// Settings of the REST server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RestConfig {
    pub host: String,
    /// `0` binds an ephemeral port
    pub port: u16,
    pub openapi_path: String,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            openapi_path: "/openapi.json".to_string(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Title of the generated OpenAPI document
    pub name: String,
    pub version: String,
    pub rest: RestConfig,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "stratum".to_string(),
            version: "1.0.0".to_string(),
            rest: RestConfig::default(),
        }
    }
}

impl ApplicationConfig {
    /// Defaults overlaid with `STRATUM_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        ConfigService::new().apply(&mut config);
        config
    }
}

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Service seeded with the process environment
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    /// Parse a setting, logging and ignoring values that do not parse
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(key, value = %raw, "ignoring unparsable setting");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Overlay the settings this service knows about onto `config`
    pub fn apply(&self, config: &mut ApplicationConfig) {
        if let Some(name) = self.get(APP_NAME_VAR) {
            config.name = name;
        }
        if let Some(host) = self.get(REST_HOST_VAR) {
            config.rest.host = host;
        }
        if let Some(port) = self.get_parsed(REST_PORT_VAR) {
            config.rest.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let service = ConfigService::default();
        service.set(REST_HOST_VAR, "0.0.0.0");
        service.set(REST_PORT_VAR, "8080");

        let mut config = ApplicationConfig::default();
        service.apply(&mut config);
        assert_eq!(config.rest.host, "0.0.0.0");
        assert_eq!(config.rest.port, 8080);
        assert_eq!(config.name, "stratum");
    }

    #[test]
    fn test_unparsable_port_is_ignored() {
        let service = ConfigService::default();
        service.set(REST_PORT_VAR, "not-a-port");

        let mut config = ApplicationConfig::default();
        service.apply(&mut config);
        assert_eq!(config.rest.port, 3000);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: ApplicationConfig =
            serde_json::from_value(serde_json::json!({"rest": {"port": 0}})).unwrap();
        assert_eq!(config.rest.port, 0);
        assert_eq!(config.rest.host, "127.0.0.1");
        assert_eq!(config.rest.openapi_path, "/openapi.json");
    }
}
