use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".swagger-guard.toml";

/// Top-level configuration from `.swagger-guard.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Where cumulative metrics are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Set to false to skip recording runs entirely.
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub connect_timeout_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "localhost".into(),
            port: 6379,
            db: 0,
            connect_timeout_ms: 500,
        }
    }
}

impl MetricsConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Apply `REDIS_HOST` / `REDIS_PORT` overrides. Empty values are ignored,
    /// as is a port that does not parse.
    pub fn apply_env(&mut self, host: Option<String>, port: Option<String>) {
        if let Some(host) = host.filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(port) = port.filter(|p| !p.is_empty()) {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!(port = %port, "ignoring invalid REDIS_PORT"),
            }
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# swagger-guard configuration

[metrics]
# Record every run in the cumulative counter store.
enabled = true

# Counter store address. REDIS_HOST / REDIS_PORT override these.
host = "localhost"
port = 6379
db = 0

# Give up on the store after this long; the scan itself still completes.
connect_timeout_ms = 500
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.metrics.port, 6379);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn starter_toml_parses_to_defaults() {
        let config: Config = toml::from_str(Config::starter_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_metrics_section_keeps_other_defaults() {
        let config: Config = toml::from_str("[metrics]\nport = 6380\n").unwrap();
        assert_eq!(config.metrics.port, 6380);
        assert_eq!(config.metrics.host, "localhost");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut metrics = MetricsConfig::default();
        metrics.apply_env(Some("redis.internal".into()), Some("7000".into()));
        assert_eq!(metrics.host, "redis.internal");
        assert_eq!(metrics.port, 7000);

        metrics.apply_env(Some(String::new()), Some("not-a-port".into()));
        assert_eq!(metrics.host, "redis.internal");
        assert_eq!(metrics.port, 7000);
    }
}
