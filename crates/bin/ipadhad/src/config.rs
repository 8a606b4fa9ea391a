//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `ipadha.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use ipadha_adapter_hub_rest::{HubRestConfig, api_base_url};
use ipadha_app::engine::EngineConfig;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Hub location and credentials.
    pub hub: HubRestConfig,
    /// Polling, push and command throttling.
    pub sync: SyncSettings,
    /// Dashboard layout.
    pub dashboard: DashboardConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// How the engine keeps in step with the hub.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Subscribe to pushed state changes over the WebSocket API.
    pub use_websocket: bool,
    /// Polling interval while push is unavailable.
    pub refresh_ms: u64,
    /// Delay before reconnecting a lost push transport.
    pub reconnect_ms: u64,
    /// Minimum spacing of intermediate slider commands per entity.
    pub throttle_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Tabs for swipe navigation, in display order.
    pub tabs: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `ipadha.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, an
    /// override does not parse, or the result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("ipadha.toml")?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides read through `lookup`, later keys winning.
    fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HA_URL") {
            self.hub.url = val;
        }
        if let Some(val) = lookup("HA_TOKEN") {
            self.hub.token = val;
        }
        if let Some(val) = lookup("HA_USE_WS") {
            self.sync.use_websocket = parse_flag(&val);
        }
        if let Some(val) = lookup("DASHBOARD_REFRESH") {
            self.sync.refresh_ms = parse_number("DASHBOARD_REFRESH", &val)?;
        }
        if let Some(val) = lookup("HA_POLLING_INTERVAL") {
            self.sync.refresh_ms = parse_number("HA_POLLING_INTERVAL", &val)?;
        }
        if let Some(val) = lookup("HA_RECONNECT_INTERVAL") {
            self.sync.reconnect_ms = parse_number("HA_RECONNECT_INTERVAL", &val)?;
        }
        if let Some(val) = lookup("IPADHA_THROTTLE_MS") {
            self.sync.throttle_ms = parse_number("IPADHA_THROTTLE_MS", &val)?;
        }
        if let Some(val) = lookup("HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("PORT") {
            self.server.port = parse_number("PORT", &val)?;
        }
        if let Some(val) = lookup("IPADHA_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.sync.refresh_ms == 0 {
            return Err(ConfigError::Validation(
                "refresh interval must be non-zero".to_string(),
            ));
        }
        if self.sync.reconnect_ms == 0 {
            return Err(ConfigError::Validation(
                "reconnect interval must be non-zero".to_string(),
            ));
        }
        if self.hub.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "request timeout must be non-zero".to_string(),
            ));
        }
        if let Err(err) = api_base_url(&self.hub.url) {
            return Err(ConfigError::Validation(format!(
                "hub url {:?}: {err}",
                self.hub.url
            )));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            refresh_interval: Duration::from_millis(self.sync.refresh_ms),
            throttle: Duration::from_millis(self.sync.throttle_ms),
            reconnect_interval: Duration::from_millis(self.sync.reconnect_ms),
            use_push: self.sync.use_websocket,
            tabs: self.dashboard.tabs.clone(),
            ..EngineConfig::default()
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            use_websocket: true,
            refresh_ms: 5000,
            reconnect_ms: 10_000,
            throttle_ms: 50,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "ipadhad=info,ipadha=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// An environment override that does not parse.
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.hub.url, "http://localhost:8123");
        assert!(config.sync.use_websocket);
        assert_eq!(config.sync.refresh_ms, 5000);
        assert_eq!(config.sync.reconnect_ms, 10_000);
        assert_eq!(config.sync.throttle_ms, 50);
        assert!(config.dashboard.tabs.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.hub.request_timeout_ms, 5000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [hub]
            url = 'https://ha.example.org'
            token = 'secret'
            request_timeout_ms = 2000

            [sync]
            use_websocket = false
            refresh_ms = 2500
            reconnect_ms = 30000
            throttle_ms = 80

            [dashboard]
            tabs = ['home', 'lights']

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.hub.url, "https://ha.example.org");
        assert_eq!(config.hub.token, "secret");
        assert_eq!(config.hub.request_timeout_ms, 2000);
        assert!(!config.sync.use_websocket);
        assert_eq!(config.sync.refresh_ms, 2500);
        assert_eq!(config.sync.reconnect_ms, 30_000);
        assert_eq!(config.sync.throttle_ms, 80);
        assert_eq!(config.dashboard.tabs, vec!["home", "lights"]);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("HA_URL", "http://hub.lan:8123"),
                ("HA_TOKEN", "abc"),
                ("HA_USE_WS", "false"),
                ("HA_POLLING_INTERVAL", "2000"),
                ("HA_RECONNECT_INTERVAL", "15000"),
                ("IPADHA_THROTTLE_MS", "100"),
                ("HOST", "127.0.0.1"),
                ("PORT", "8080"),
                ("IPADHA_LOG", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.hub.url, "http://hub.lan:8123");
        assert_eq!(config.hub.token, "abc");
        assert!(!config.sync.use_websocket);
        assert_eq!(config.sync.refresh_ms, 2000);
        assert_eq!(config.sync.reconnect_ms, 15_000);
        assert_eq!(config.sync.throttle_ms, 100);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_prefer_polling_interval_over_dashboard_refresh() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("DASHBOARD_REFRESH", "3000"),
                ("HA_POLLING_INTERVAL", "7000"),
            ]))
            .unwrap();
        assert_eq!(config.sync.refresh_ms, 7000);

        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[("DASHBOARD_REFRESH", "3000")]))
            .unwrap();
        assert_eq!(config.sync.refresh_ms, 3000);
    }

    #[test]
    fn should_prefer_rust_log_over_ipadha_log() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[("IPADHA_LOG", "debug"), ("RUST_LOG", "trace")]))
            .unwrap();
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_keep_push_enabled_unless_explicitly_disabled() {
        for (value, expected) in [("true", true), ("1", true), ("FALSE", false), ("0", false)] {
            let mut config = Config::default();
            config
                .apply_env_overrides(env(&[("HA_USE_WS", value)]))
                .unwrap();
            assert_eq!(config.sync.use_websocket, expected, "HA_USE_WS={value}");
        }
    }

    #[test]
    fn should_reject_unparsable_numeric_override() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "PORT", .. }));
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_intervals() {
        let mut config = Config::default();
        config.sync.refresh_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sync.reconnect_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.hub.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_non_http_hub_url() {
        let mut config = Config::default();
        config.hub.url = "ftp://hub.lan".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));

        config.hub.url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_map_settings_into_engine_config() {
        let mut config = Config::default();
        config.sync.refresh_ms = 1000;
        config.sync.use_websocket = false;
        config.dashboard.tabs = vec!["home".to_string()];

        let engine = config.engine_config();
        assert_eq!(engine.refresh_interval, Duration::from_secs(1));
        assert_eq!(engine.throttle, Duration::from_millis(50));
        assert_eq!(engine.reconnect_interval, Duration::from_secs(10));
        assert!(!engine.use_push);
        assert_eq!(engine.tabs, vec!["home"]);
    }
}
