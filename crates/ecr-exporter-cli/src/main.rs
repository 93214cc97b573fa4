//! ECR Exporter - Prometheus exporter for Amazon ECR repositories.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ecr_exporter_metrics::ScrapeEngine;
use ecr_exporter_registry::{EcrApi, RegistryClient};
use tracing::{error, info};

mod config;
mod health;
mod logging;
mod server;

use config::Cli;
use server::AppState;

const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(30);

async fn check_connectivity(api: &EcrApi) {
    info!("Testing AWS connectivity...");
    match tokio::time::timeout(CONNECTIVITY_TIMEOUT, api.probe()).await {
        Ok(Ok(())) => info!("AWS connectivity test successful"),
        Ok(Err(e)) => {
            error!(error = %e, error_kind = %e.kind(), "AWS connectivity test failed");
            info!("Continuing anyway, metrics collection will show errors");
        }
        Err(_) => {
            error!(timeout_secs = CONNECTIVITY_TIMEOUT.as_secs(), "AWS connectivity test timed out");
            info!("Continuing anyway, metrics collection will show errors");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    info!(version = env!("CARGO_PKG_VERSION"), "Starting ECR Prometheus Exporter");

    info!("Loading AWS configuration...");
    let api = EcrApi::from_config(&cli.registry_config())
        .await
        .context("invalid registry configuration")?;

    if !cli.skip_connectivity_check {
        check_connectivity(&api).await;
    }

    let engine = ScrapeEngine::new(RegistryClient::new(Arc::new(api)));
    info!(
        metrics = engine.describe().len(),
        scrape_timeout_secs = cli.scrape_timeout_secs,
        "Scrape engine ready"
    );

    let state = AppState::new(engine, cli.scrape_timeout());
    server::serve(cli.listen_addr, state)
        .await
        .with_context(|| format!("failed to serve on {}", cli.listen_addr))
}
