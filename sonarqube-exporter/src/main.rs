//! Prometheus exporter for SonarQube.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sonarqube_client::SonarQubeClient;
use tokio::sync::watch;
use tracing::{error, info};

use sonarqube_exporter::{ExporterArgs, HttpServer, SonarQubeCollector, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ExporterArgs::parse();
    let config = args.load_config()?;

    init_tracing(&config.logging)?;

    info!("Starting SonarQube Prometheus Exporter");
    info!(url = %config.sonarqube.url, "SonarQube server");

    let client = SonarQubeClient::with_timeout(
        config.sonarqube.url.clone(),
        config.sonarqube.token.clone(),
        config.sonarqube.timeout(),
    )?;
    let collector = Arc::new(SonarQubeCollector::new(client, &config.prometheus));

    let http_server = HttpServer::new(
        collector.clone(),
        config.address(),
        config.server.path.clone(),
    );

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(shutdown_rx).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!(
        "Metrics available at http://{}{}",
        config.address(),
        config.server.path
    );

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    if tokio::time::timeout(Duration::from_secs(5), http_task)
        .await
        .is_err()
    {
        error!("HTTP server did not stop within 5s");
    }

    let stats = collector.stats();
    info!(
        scrapes = stats.scrapes,
        failed_scrapes = stats.failed_scrapes,
        measure_fetch_errors = stats.measure_fetch_errors,
        parse_errors = stats.parse_errors,
        "Final statistics"
    );

    info!("Exporter stopped");
    Ok(())
}

#[cfg(unix)]
async fn terminate() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
