//! # ECR Exporter Registry
//!
//! Registry client adapter for the ECR exporter.
//!
//! This crate wraps the paginated "describe repositories" and "describe
//! images" calls of a container registry behind two operations that each
//! return a complete, ordered listing.
//!
//! ## Features
//!
//! - **Lazy paging**: every listing is driven by a page stream that follows
//!   continuation tokens until a page carries none
//! - **All-or-nothing listings**: a failed page discards everything fetched so far
//! - **Deadlines**: one [`ScrapeContext`] bounds every remote call of a scrape
//! - **Categorized errors**: not found, throttled, transient, other
//! - **Amazon ECR backend** via the AWS SDK
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ecr_exporter_registry::{EcrApi, RegistryClient, RegistryConfig, ScrapeContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = EcrApi::from_config(&RegistryConfig::new().with_region("eu-west-1")).await?;
//!     let client = RegistryClient::new(Arc::new(api));
//!
//!     let ctx = ScrapeContext::with_timeout(Duration::from_secs(300));
//!     for repo in client.list_repositories(&ctx).await? {
//!         println!("{:?}", repo.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RegistryClient                           │
//! │   list_repositories / list_images  (drain a PageStream)     │
//! └─────────────────────────────────────────────────────────────┘
//!                          │ one call per page
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              dyn RegistryApi  (EcrApi, mocks)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod client;
mod config;
mod context;
mod ecr;
mod error;
mod types;

pub use api::RegistryApi;
pub use client::{PageStream, RegistryClient};
pub use config::{RegistryConfig, MAX_PAGE_SIZE};
pub use context::ScrapeContext;
pub use ecr::EcrApi;
pub use error::{ConfigError, ErrorKind, RecordError, RegistryApiError};
pub use types::{ImageDetail, Page, Repository, RepositoryRecord};
