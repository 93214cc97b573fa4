//! # ECR Exporter Test
//!
//! Test support for the ECR exporter workspace.
//!
//! This crate provides:
//!
//! - [`MockRegistry`], a scripted [`RegistryApi`](ecr_exporter_registry::RegistryApi)
//!   with call recording, injected failures, and artificial latency
//! - Fixtures for repository records and image details
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ecr_exporter_registry::RegistryClient;
//! use ecr_exporter_test::{image, repository, MockRegistry};
//!
//! let registry = Arc::new(
//!     MockRegistry::new()
//!         .with_repositories(vec![repository("payments")])
//!         .with_images("payments", vec![image(100, 1_700_000_000, 1_700_000_500)]),
//! );
//! let client = RegistryClient::new(registry.clone());
//! ```

pub mod fixtures;
pub mod mock_registry;

pub use fixtures::{
    image, repository, repository_uri, repository_without_name, repository_without_uri,
    sized_image, ts, ACCOUNT_ID, REGION,
};
pub use mock_registry::{Call, MockRegistry};
