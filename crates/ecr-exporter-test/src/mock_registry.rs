//! Scripted in-memory registry.
//!
//! [`MockRegistry`] implements [`RegistryApi`] from a fixed script of pages.
//! Continuation tokens are `page-N`, where `N` is the index of the next page.
//! Every call is recorded so tests can assert on the exact request sequence.
//!
//! # Examples
//!
//! ```rust
//! use ecr_exporter_test::{repository, sized_image, MockRegistry};
//!
//! let registry = MockRegistry::new()
//!     .with_repository_pages(vec![vec![repository("a")], vec![repository("b")]])
//!     .with_images("a", vec![sized_image(100)])
//!     .with_images("b", vec![]);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use ecr_exporter_registry::{ImageDetail, Page, RegistryApi, RegistryApiError, RepositoryRecord};
use parking_lot::Mutex;

/// A request received by [`MockRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `describe_repositories` with the given token.
    DescribeRepositories {
        /// Token passed in.
        next_token: Option<String>,
    },
    /// `describe_images` for a repository with the given token.
    DescribeImages {
        /// Repository requested.
        repository: String,
        /// Token passed in.
        next_token: Option<String>,
    },
}

/// Scripted listing: pages, optionally followed by a failure.
#[derive(Debug, Clone)]
struct Script<T> {
    pages: Vec<Vec<T>>,
    /// Returned instead of the page at `fail_at`.
    failure: Option<(usize, RegistryApiError)>,
}

impl<T: Clone> Script<T> {
    const fn pages(pages: Vec<Vec<T>>) -> Self {
        Self {
            pages,
            failure: None,
        }
    }

    fn page(&self, next_token: Option<&str>) -> Result<Page<T>, RegistryApiError> {
        let index = match next_token {
            None => 0,
            Some(token) => parse_token(token)?,
        };

        if let Some((fail_at, err)) = &self.failure {
            if *fail_at == index {
                return Err(err.clone());
            }
        }

        // An empty script still answers the first call with an empty page.
        let items = self.pages.get(index).cloned().unwrap_or_default();
        let has_more = index + 1 < self.pages.len() || self.failure.as_ref().is_some_and(|(at, _)| *at > index);
        Ok(Page {
            items,
            next_token: has_more.then(|| format!("page-{}", index + 1)),
        })
    }
}

fn parse_token(token: &str) -> Result<usize, RegistryApiError> {
    token
        .strip_prefix("page-")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| RegistryApiError::Other {
            message: format!("invalid continuation token: {token}"),
        })
}

/// In-memory [`RegistryApi`] driven by a script.
#[derive(Debug)]
pub struct MockRegistry {
    repositories: Script<RepositoryRecord>,
    images: HashMap<String, Script<ImageDetail>>,
    latency: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegistry {
    /// Creates a registry with no repositories.
    #[must_use]
    pub fn new() -> Self {
        Self {
            repositories: Script::pages(Vec::new()),
            images: HashMap::new(),
            latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serves `repositories` as a single page.
    #[must_use]
    pub fn with_repositories(self, repositories: Vec<RepositoryRecord>) -> Self {
        self.with_repository_pages(vec![repositories])
    }

    /// Serves repositories split across the given pages.
    #[must_use]
    pub fn with_repository_pages(mut self, pages: Vec<Vec<RepositoryRecord>>) -> Self {
        self.repositories.pages = pages;
        self
    }

    /// Fails the repository listing at page `at` (0 = the first call).
    #[must_use]
    pub fn failing_repositories_at(mut self, at: usize, err: RegistryApiError) -> Self {
        self.repositories.failure = Some((at, err));
        self
    }

    /// Fails the repository listing on the first call.
    #[must_use]
    pub fn failing_repositories(self, err: RegistryApiError) -> Self {
        self.failing_repositories_at(0, err)
    }

    /// Serves `images` for `repository` as a single page.
    #[must_use]
    pub fn with_images(self, repository: &str, images: Vec<ImageDetail>) -> Self {
        self.with_image_pages(repository, vec![images])
    }

    /// Serves images for `repository` split across the given pages.
    #[must_use]
    pub fn with_image_pages(mut self, repository: &str, pages: Vec<Vec<ImageDetail>>) -> Self {
        self.images
            .entry(repository.to_string())
            .or_insert_with(|| Script::pages(Vec::new()))
            .pages = pages;
        self
    }

    /// Fails the image listing of `repository` at page `at`.
    #[must_use]
    pub fn failing_images_at(mut self, repository: &str, at: usize, err: RegistryApiError) -> Self {
        self.images
            .entry(repository.to_string())
            .or_insert_with(|| Script::pages(Vec::new()))
            .failure = Some((at, err));
        self
    }

    /// Fails the image listing of `repository` on the first call.
    #[must_use]
    pub fn failing_images(self, repository: &str, err: RegistryApiError) -> Self {
        self.failing_images_at(repository, 0, err)
    }

    /// Delays every response by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Forgets recorded calls.
    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RegistryApi for MockRegistry {
    async fn describe_repositories(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<RepositoryRecord>, RegistryApiError> {
        self.calls.lock().push(Call::DescribeRepositories {
            next_token: next_token.clone(),
        });
        self.delay().await;
        self.repositories.page(next_token.as_deref())
    }

    async fn describe_images(
        &self,
        repository_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<ImageDetail>, RegistryApiError> {
        self.calls.lock().push(Call::DescribeImages {
            repository: repository_name.to_string(),
            next_token: next_token.clone(),
        });
        self.delay().await;
        self.images.get(repository_name).map_or_else(
            || {
                Err(RegistryApiError::NotFound {
                    resource: repository_name.to_string(),
                })
            },
            |script| script.page(next_token.as_deref()),
        )
    }
}
