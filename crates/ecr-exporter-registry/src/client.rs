//! Paginating client over a [`RegistryApi`].
//!
//! This module turns page-level calls into complete listings. Each listing
//! is driven by a lazy paged sequence that issues one remote call per page
//! and stops after the first page without a continuation token.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt, TryStreamExt};

use crate::api::RegistryApi;
use crate::context::ScrapeContext;
use crate::error::RegistryApiError;
use crate::types::{ImageDetail, Page, RepositoryRecord};

/// Lazy sequence of pages. Restartable per call, not mid-iteration.
pub type PageStream<T> = BoxStream<'static, Result<Page<T>, RegistryApiError>>;

type PageFuture<T> = BoxFuture<'static, Result<Page<T>, RegistryApiError>>;

const DESCRIBE_REPOSITORIES: &str = "DescribeRepositories";
const DESCRIBE_IMAGES: &str = "DescribeImages";

/// Client that materializes complete repository and image listings.
///
/// The underlying handle may be absent, in which case every listing fails
/// with [`RegistryApiError::ClientUnavailable`].
#[derive(Clone, Default)]
pub struct RegistryClient {
    api: Option<Arc<dyn RegistryApi>>,
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("available", &self.api.is_some())
            .finish()
    }
}

impl RegistryClient {
    /// Creates a client over the given API handle.
    #[must_use]
    pub fn new(api: Arc<dyn RegistryApi>) -> Self {
        Self { api: Some(api) }
    }

    /// Creates a client without a handle.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { api: None }
    }

    /// Creates a client from an optional handle.
    #[must_use]
    pub fn from_option(api: Option<Arc<dyn RegistryApi>>) -> Self {
        Self { api }
    }

    /// Returns true if a handle is configured.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.api.is_some()
    }

    /// Returns the lazy page sequence of all repositories.
    #[must_use]
    pub fn pages_of_repositories(&self, ctx: ScrapeContext) -> PageStream<RepositoryRecord> {
        self.paged(ctx, DESCRIBE_REPOSITORIES, |api, token| {
            async move { api.describe_repositories(token).await }.boxed()
        })
    }

    /// Returns the lazy page sequence of images in one repository.
    #[must_use]
    pub fn pages_of_images(&self, ctx: ScrapeContext, repository_name: &str) -> PageStream<ImageDetail> {
        let repository_name = repository_name.to_owned();
        self.paged(ctx, DESCRIBE_IMAGES, move |api, token| {
            let repository_name = repository_name.clone();
            async move { api.describe_images(&repository_name, token).await }.boxed()
        })
    }

    /// Lists every repository, following continuation tokens to the end.
    ///
    /// # Errors
    ///
    /// Returns the first failed call. Pages fetched before it are discarded.
    pub async fn list_repositories(
        &self,
        ctx: &ScrapeContext,
    ) -> Result<Vec<RepositoryRecord>, RegistryApiError> {
        tracing::debug!("Starting to fetch repositories");

        let result = drain(self.pages_of_repositories(*ctx), DESCRIBE_REPOSITORIES, None).await;
        match &result {
            Ok(repositories) => {
                tracing::debug!(total = repositories.len(), "Fetched all repositories");
            }
            Err(e) => {
                tracing::error!(error = %e, error_kind = %e.kind(), "DescribeRepositories failed");
            }
        }
        result
    }

    /// Lists every image in one repository, following continuation tokens to the end.
    ///
    /// # Errors
    ///
    /// Returns the first failed call. Pages fetched before it are discarded.
    pub async fn list_images(
        &self,
        ctx: &ScrapeContext,
        repository_name: &str,
    ) -> Result<Vec<ImageDetail>, RegistryApiError> {
        tracing::debug!(repository = repository_name, "Starting to fetch images");

        let result = drain(
            self.pages_of_images(*ctx, repository_name),
            DESCRIBE_IMAGES,
            Some(repository_name),
        )
        .await;
        match &result {
            Ok(images) => {
                tracing::debug!(repository = repository_name, total = images.len(), "Fetched all images");
            }
            Err(e) => {
                tracing::error!(
                    repository = repository_name,
                    error = %e,
                    error_kind = %e.kind(),
                    "DescribeImages failed"
                );
            }
        }
        result
    }

    fn paged<T, F>(&self, ctx: ScrapeContext, operation: &'static str, fetch: F) -> PageStream<T>
    where
        T: Send + 'static,
        F: Fn(Arc<dyn RegistryApi>, Option<String>) -> PageFuture<T> + Send + 'static,
    {
        let api = self.api.clone();

        // `Some(token)` fetches the next page, `None` ends the sequence.
        stream::try_unfold(Some(None), move |cursor: Option<Option<String>>| {
            let call = cursor.map(|token| {
                api.clone()
                    .map(|api| fetch(api, token))
                    .ok_or(RegistryApiError::ClientUnavailable)
            });

            async move {
                let Some(call) = call else {
                    return Ok::<_, RegistryApiError>(None);
                };
                let page = with_deadline(ctx, operation, call?).await?;
                let next = page.continuation().map(|token| Some(token.to_owned()));
                Ok(Some((page, next)))
            }
        })
        .boxed()
    }
}

/// Runs one remote call bounded by the scrape deadline.
async fn with_deadline<T>(
    ctx: ScrapeContext,
    operation: &'static str,
    call: PageFuture<T>,
) -> Result<Page<T>, RegistryApiError> {
    let timeout = || RegistryApiError::Timeout {
        operation: operation.to_string(),
    };

    if ctx.is_expired() {
        return Err(timeout());
    }

    tokio::time::timeout_at(ctx.deadline(), call)
        .await
        .map_err(|_| timeout())?
}

async fn drain<T>(
    mut pages: PageStream<T>,
    operation: &'static str,
    repository: Option<&str>,
) -> Result<Vec<T>, RegistryApiError> {
    let mut all = Vec::new();
    while let Some(page) = pages.try_next().await? {
        tracing::debug!(
            operation,
            repository = ?repository,
            batch = page.items.len(),
            more = page.continuation().is_some(),
            "Got page"
        );
        all.extend(page.items);
    }
    Ok(all)
}
