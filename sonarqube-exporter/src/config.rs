//! Configuration for the SonarQube exporter.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Upstream SonarQube server.
    #[serde(default)]
    pub sonarqube: SonarQubeConfig,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Metric naming.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream SonarQube connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SonarQubeConfig {
    /// Server base URL, e.g. `https://sonar.example.com`.
    #[serde(default)]
    pub url: String,

    /// Token sent as a bearer credential.
    #[serde(default)]
    pub token: String,

    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for SonarQubeConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl SonarQubeConfig {
    /// The request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind (default: "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (default: 9090).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9090
}

fn default_path() -> String {
    "/metrics".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
        }
    }
}

/// Metric naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// Metric name prefix (default: "sonarqube").
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "sonarqube".to_string()
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    ///
    /// The result is not validated; callers apply CLI overrides first and
    /// then call [`ExporterConfig::validate`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(json5::from_str(&content)?)
    }

    /// Parse and validate configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// The `host:port` the HTTP server binds to.
    ///
    /// The host may be a name; it is resolved when the listener binds.
    pub fn address(&self) -> String {
        if self.server.host.contains(':') {
            format!("[{}]:{}", self.server.host, self.server.port)
        } else {
            format!("{}:{}", self.server.host, self.server.port)
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sonarqube.url.is_empty() {
            return Err(ConfigError::Validation(
                "sonarqube url is required (set via --sonarqube-url or SONARQUBE_URL)".to_string(),
            ));
        }

        if self.sonarqube.token.is_empty() {
            return Err(ConfigError::Validation(
                "sonarqube token is required (set via --sonarqube-token or SONARQUBE_TOKEN)"
                    .to_string(),
            ));
        }

        if self.sonarqube.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        let host = self.server.host.trim();
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "Invalid listen host: {:?}",
                self.server.host
            )));
        }

        // Validate path starts with /
        if !self.server.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }

        if self.server.path == "/" || self.server.path == "/health" {
            return Err(ConfigError::Validation(format!(
                "Metrics path {} is reserved",
                self.server.path
            )));
        }

        if self.prometheus.prefix.is_empty() {
            return Err(ConfigError::Validation(
                "Metric prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        sonarqube: { url: "https://sonar.example.com", token: "squ_abc" }
    }"#;

    #[test]
    fn test_parse_minimal_config() {
        let config = ExporterConfig::parse(MINIMAL).unwrap();

        assert_eq!(config.sonarqube.url, "https://sonar.example.com");
        assert_eq!(config.sonarqube.timeout_secs, 30);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.path, "/metrics");
        assert_eq!(config.prometheus.prefix, "sonarqube");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            sonarqube: {
                url: "http://localhost:9000",
                token: "squ_abc",
                timeout_secs: 10,
            },
            server: {
                host: "127.0.0.1",
                port: 9191,
                path: "/prometheus/metrics",
            },
            prometheus: { prefix: "sq" },
            logging: {
                level: "debug",
                format: "json",
            },
        }"#;

        let config = ExporterConfig::parse(json).unwrap();

        assert_eq!(config.sonarqube.timeout(), Duration::from_secs(10));
        assert_eq!(config.address(), "127.0.0.1:9191");
        assert_eq!(config.server.path, "/prometheus/metrics");
        assert_eq!(config.prometheus.prefix, "sq");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_url() {
        let result = ExporterConfig::parse(r#"{ sonarqube: { token: "t" } }"#);
        assert!(result.unwrap_err().to_string().contains("url is required"));
    }

    #[test]
    fn test_missing_token() {
        let result = ExporterConfig::parse(r#"{ sonarqube: { url: "http://x" } }"#);
        assert!(result.unwrap_err().to_string().contains("token is required"));
    }

    #[test]
    fn test_validate_invalid_host() {
        let json = r#"{
            sonarqube: { url: "http://x", token: "t" },
            server: { host: "not an address" }
        }"#;

        let result = ExporterConfig::parse(json);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen host")
        );
    }

    #[test]
    fn test_validate_empty_host() {
        let json = r#"{
            sonarqube: { url: "http://x", token: "t" },
            server: { host: "" }
        }"#;

        assert!(ExporterConfig::parse(json).is_err());
    }

    #[test]
    fn test_hostname_listen_address() {
        let json = r#"{
            sonarqube: { url: "http://x", token: "t" },
            server: { host: "localhost" }
        }"#;

        let config = ExporterConfig::parse(json).unwrap();
        assert_eq!(config.address(), "localhost:9090");
    }

    #[test]
    fn test_validate_invalid_path() {
        let json = r#"{
            sonarqube: { url: "http://x", token: "t" },
            server: { path: "no-leading-slash" }
        }"#;

        let result = ExporterConfig::parse(json);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("must start with /")
        );
    }

    #[test]
    fn test_validate_reserved_path() {
        let json = r#"{
            sonarqube: { url: "http://x", token: "t" },
            server: { path: "/health" }
        }"#;

        let result = ExporterConfig::parse(json);
        assert!(result.unwrap_err().to_string().contains("reserved"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let json = r#"{ sonarqube: { url: "http://x", token: "t", timeout_secs: 0 } }"#;
        assert!(ExporterConfig::parse(json).is_err());
    }

    #[test]
    fn test_ipv6_address() {
        let mut config = ExporterConfig::default();
        config.sonarqube.url = "http://x".to_string();
        config.sonarqube.token = "t".to_string();
        config.server.host = "::1".to_string();
        config.server.port = 9100;

        assert_eq!(config.address(), "[::1]:9100");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exporter.json5");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = ExporterConfig::load_from_file(&path).unwrap();
        assert_eq!(config.sonarqube.token, "squ_abc");
    }

    #[test]
    fn test_load_missing_file() {
        let result = ExporterConfig::load_from_file("/nonexistent/exporter.json5");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
