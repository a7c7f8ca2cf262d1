//! Configuration loading and types for ShareIt.
//!
//! Configuration is read from a YAML file and deserialized into the
//! [`Config`] struct.  The server and the gateway share one file; each
//! binary reads the sections it needs.

use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Gateway listener and upstream settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Persistence settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Observability settings (metrics + health endpoint).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    pub fn server_bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn gateway_bind_addr(&self) -> String {
        format!("{}:{}", self.gateway.host, self.gateway.port)
    }
}

/// Server listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Maximum accepted JSON body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_server_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Bind host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Base URL of the server that valid requests are forwarded to.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum accepted JSON body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_gateway_port(),
            server_url: default_server_url(),
            timeout_secs: default_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// SQLite-specific configuration.
    #[serde(default)]
    pub sqlite: SqliteConfig,
}

/// SQLite-specific configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file, or `:memory:`.
    #[serde(default = "default_sqlite_path")]
    pub path: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: default_sqlite_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: text or json.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Observability settings. Both are enabled by default.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Enable Prometheus metrics collection and the `/metrics` endpoint.
    #[serde(default = "default_true")]
    pub metrics: bool,

    /// Enable the `/health` endpoint.
    #[serde(default = "default_true")]
    pub health_check: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics: true,
            health_check: true,
        }
    }
}

// -- Defaults ----------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    9090
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_server_url() -> String {
    "http://localhost:9090".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    64 * 1024
}

fn default_sqlite_path() -> String {
    "./data/shareit.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

// -- Loader ------------------------------------------------------------------

/// Load and parse configuration from a YAML file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let config: Config = serde_yaml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.server_bind_addr(), "0.0.0.0:9090");
        assert_eq!(config.gateway_bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.gateway.server_url, "http://localhost:9090");
        assert_eq!(config.store.sqlite.path, "./data/shareit.db");
        assert_eq!(config.logging.format, "text");
        assert!(config.observability.metrics);
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
server:
  port: 9999
gateway:
  server_url: "http://shareit-server:9090"
  timeout_secs: 5
  max_body_size: 4096
logging:
  format: json
observability:
  metrics: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.gateway.server_url, "http://shareit-server:9090");
        assert_eq!(config.gateway.timeout_secs, 5);
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.max_body_size, 4096);
        assert_eq!(config.server.max_body_size, 64 * 1024);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert!(!config.observability.metrics);
        assert!(config.observability.health_check);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "store:\n  sqlite:\n    path: \":memory:\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.store.sqlite.path, ":memory:");
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("/definitely/not/here.yaml").is_err());
    }
}
