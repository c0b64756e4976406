//! CLI argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ExporterConfig};

/// Prometheus exporter for SonarQube.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sonarqube-exporter")]
#[command(about = "Export SonarQube project measures as Prometheus metrics")]
#[command(version)]
pub struct ExporterArgs {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind the exporter server (overrides config).
    #[arg(long, env = "EXPORTER_HOST")]
    pub host: Option<String>,

    /// Port to bind the exporter server (overrides config).
    #[arg(long, env = "EXPORTER_PORT")]
    pub port: Option<u16>,

    /// SonarQube server URL (overrides config).
    #[arg(long, env = "SONARQUBE_URL")]
    pub sonarqube_url: Option<String>,

    /// SonarQube authentication token (overrides config).
    #[arg(long, env = "SONARQUBE_TOKEN", hide_env_values = true)]
    pub sonarqube_token: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ExporterArgs {
    /// Overlay the CLI values on top of `config`.
    pub fn apply(&self, config: &mut ExporterConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.sonarqube_url {
            config.sonarqube.url = url.clone();
        }
        if let Some(token) = &self.sonarqube_token {
            config.sonarqube.token = token.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }

    /// Load the config file (if any), apply overrides and validate.
    pub fn load_config(&self) -> Result<ExporterConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ExporterConfig::load_from_file(path)?,
            None => ExporterConfig::default(),
        };

        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}
