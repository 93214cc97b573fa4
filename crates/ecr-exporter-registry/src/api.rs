//! Page-level registry API seam.

use async_trait::async_trait;

use crate::error::RegistryApiError;
use crate::types::{ImageDetail, Page, RepositoryRecord};

/// One remote call per method invocation, one page per call.
///
/// Implementations must be safe to reuse across sequential calls and
/// across concurrent scrapes; they hold no per-scrape state.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Fetches one page of repositories, starting at `next_token`.
    async fn describe_repositories(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<RepositoryRecord>, RegistryApiError>;

    /// Fetches one page of images in `repository_name`, starting at `next_token`.
    async fn describe_images(
        &self,
        repository_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<ImageDetail>, RegistryApiError>;
}
