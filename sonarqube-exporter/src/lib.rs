//! Prometheus metrics exporter for SonarQube.
//!
//! Every scrape of the metrics endpoint runs one collection cycle against
//! the SonarQube web API and renders the result in Prometheus text format.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │    SonarQube    │<────│    Collector    │<────│   HTTP Server   │
//! │   (web API)     │     │ (per scrape)    │     │   (/metrics)    │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! A cycle fetches the metric catalog, keeps the numeric non-hidden keys,
//! walks every project page, then requests each project's measures. Each
//! project contributes one `<prefix>_project_info` series plus one series
//! per parsed measure.
//!
//! # Usage
//!
//! ```bash
//! sonarqube-exporter --sonarqube-url https://sonar.example.com --sonarqube-token squ_...
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod args;
pub mod collector;
pub mod config;
pub mod descriptor;
pub mod exposition;
pub mod http;
pub mod mapping;
pub mod value;

pub use args::ExporterArgs;
pub use collector::{CollectorStats, Sample, SharedCollector, SonarQubeCollector};
pub use config::{ConfigError, ExporterConfig, LogFormat, LoggingConfig};
pub use descriptor::{Descriptor, DescriptorCache};
pub use http::HttpServer;
pub use value::{ParseError, parse_value};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
        }
    }

    Ok(())
}
