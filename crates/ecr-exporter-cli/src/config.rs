//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use ecr_exporter_registry::RegistryConfig;

/// Longest accepted scrape timeout: one day.
pub const MAX_SCRAPE_TIMEOUT_SECS: u64 = 86_400;

/// Prometheus exporter for Amazon ECR repositories
#[derive(Parser, Debug, Clone)]
#[command(name = "ecr-exporter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to serve HTTP on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// Log level (debug, info, warn, error, fatal, panic)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Upper bound on one scrape, in seconds (1-86400)
    #[arg(
        long,
        env = "SCRAPE_TIMEOUT_SECS",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..=MAX_SCRAPE_TIMEOUT_SECS)
    )]
    pub scrape_timeout_secs: u64,

    /// AWS region of the registry
    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// Override the ECR endpoint URL
    #[arg(long, env = "ECR_ENDPOINT_URL")]
    pub ecr_endpoint_url: Option<String>,

    /// Registry (account) ID, when not the caller's own
    #[arg(long, env = "ECR_REGISTRY_ID")]
    pub registry_id: Option<String>,

    /// Results per page for describe calls (1-1000)
    #[arg(long, env = "ECR_PAGE_SIZE")]
    pub page_size: Option<i32>,

    /// Skip the AWS connectivity check at startup
    #[arg(long)]
    pub skip_connectivity_check: bool,
}

impl Cli {
    /// Returns the scrape deadline duration.
    pub const fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }

    /// Builds the registry client configuration.
    pub fn registry_config(&self) -> RegistryConfig {
        let mut config = RegistryConfig::new();
        if let Some(region) = &self.aws_region {
            config = config.with_region(region);
        }
        if let Some(url) = &self.ecr_endpoint_url {
            config = config.with_endpoint_url(url);
        }
        if let Some(id) = &self.registry_id {
            config = config.with_registry_id(id);
        }
        if let Some(size) = self.page_size {
            config = config.with_page_size(size);
        }
        config
    }
}
