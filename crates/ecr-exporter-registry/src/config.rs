//! Configuration types for the ECR backend.

use std::time::Duration;

use crate::error::ConfigError;

/// Largest page size accepted by `DescribeRepositories` and `DescribeImages`.
pub const MAX_PAGE_SIZE: i32 = 1000;

/// Configuration for the ECR API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// AWS region; `None` uses the default provider chain.
    pub region: Option<String>,

    /// Endpoint override (e.g. a local ECR emulator).
    pub endpoint_url: Option<String>,

    /// Registry (account) ID; `None` uses the caller's default registry.
    pub registry_id: Option<String>,

    /// Records per page; `None` lets the registry choose.
    pub page_size: Option<i32>,

    /// TCP connect timeout.
    pub connect_timeout: Duration,

    /// Upper bound for one API operation including retries.
    pub operation_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryConfig {
    /// Creates a configuration that relies on the default AWS provider chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecr_exporter_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new();
    /// assert!(config.region.is_none());
    /// assert!(config.page_size.is_none());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            registry_id: None,
            page_size: None,
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(60),
        }
    }

    /// Sets the AWS region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the endpoint override.
    #[must_use]
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Sets the registry ID.
    #[must_use]
    pub fn with_registry_id(mut self, registry_id: impl Into<String>) -> Self {
        self.registry_id = Some(registry_id.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Sets the per-operation timeout.
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Checks values the registry would reject.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPageSize`] if the page size is outside `1..=1000`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecr_exporter_registry::RegistryConfig;
    ///
    /// assert!(RegistryConfig::new().with_page_size(100).validate().is_ok());
    /// assert!(RegistryConfig::new().with_page_size(0).validate().is_err());
    /// ```
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if let Some(value) = self.page_size {
            if value < 1 || value > MAX_PAGE_SIZE {
                return Err(ConfigError::InvalidPageSize {
                    value,
                    max: MAX_PAGE_SIZE,
                });
            }
        }
        Ok(())
    }
}
