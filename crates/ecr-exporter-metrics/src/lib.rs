//! # ECR Exporter Metrics
//!
//! Scrape engine and metric schema for the ECR exporter.
//!
//! One scrape lists every repository, lists the images of each repository in
//! turn, and emits per-repository size and activity statistics into a
//! [`MetricSink`] as they are computed.
//!
//! ## Features
//!
//! - **Fixed schema**: nine metrics under the `ecr` namespace, see [`descriptor`]
//! - **Streaming output**: samples are pushed to the sink as they are produced
//! - **Degraded scrapes**: registry failures become zero-valued metrics and a
//!   count in `ecr_scrape_errors_total`, never a failed scrape
//! - **Prometheus exposition** via [`PrometheusSink`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ecr_exporter_metrics::{PrometheusSink, ScrapeEngine};
//! use ecr_exporter_registry::{EcrApi, RegistryClient, RegistryConfig, ScrapeContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = EcrApi::from_config(&RegistryConfig::new()).await?;
//!     let engine = ScrapeEngine::new(RegistryClient::new(Arc::new(api)));
//!
//!     let mut sink = PrometheusSink::new()?;
//!     let ctx = ScrapeContext::with_timeout(Duration::from_secs(300));
//!     engine.collect(&ctx, &mut sink).await?;
//!
//!     print!("{}", sink.encode()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Emission order
//!
//! ```text
//! ecr_repositories_total
//! for each repository:
//!     ecr_images_total
//!     ecr_image_size_{min,max,avg}_bytes   (if any image has a size)
//!     ecr_latest_push_timestamp            (if any image has a push time)
//!     ecr_latest_pull_timestamp            (if any image has a pull time)
//! ecr_scrape_errors_total
//! ecr_scrape_duration_seconds
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod aggregate;
pub mod descriptor;
mod engine;
mod exposition;
mod sink;


pub use aggregate::{RepositoryAggregate, SizeStats};
pub use descriptor::{MetricDesc, MetricKind, DESCRIPTORS};
pub use engine::{ScrapeEngine, ScrapeSummary};
pub use exposition::PrometheusSink;
pub use sink::{ChannelSink, MetricSink, Sample, SinkError};
