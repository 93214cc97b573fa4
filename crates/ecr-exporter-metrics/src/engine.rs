//! One scrape cycle from repository listing to emitted samples.

use std::time::{Duration, Instant};

use ecr_exporter_registry::{RecordError, RegistryClient, Repository, RepositoryRecord, ScrapeContext};
use tracing::{debug, error, info, warn};

use crate::aggregate::RepositoryAggregate;
use crate::descriptor::{
    MetricDesc, DESCRIPTORS, IMAGES_TOTAL, REPOSITORIES_TOTAL, SCRAPE_DURATION_SECONDS,
    SCRAPE_ERRORS_TOTAL,
};
use crate::sink::{MetricSink, Sample, SinkError};

/// Outcome of one scrape, returned for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSummary {
    /// Repositories reported by the registry.
    pub repositories: usize,
    /// Repositories whose images were listed successfully.
    pub repositories_scraped: usize,
    /// Errors absorbed during the scrape.
    pub errors: u64,
    /// Wall-clock duration.
    pub duration: Duration,
}

enum RepositoryOutcome {
    Scraped,
    Malformed,
    FetchFailed,
}

/// Scrape engine for one registry.
///
/// Holds no per-scrape state: every call to [`collect`](Self::collect) keeps
/// its own error counter and timer, so overlapping scrapes are independent.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use ecr_exporter_metrics::ScrapeEngine;
/// use ecr_exporter_registry::{RegistryClient, ScrapeContext};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let engine = ScrapeEngine::new(RegistryClient::unavailable());
/// let mut samples = Vec::new();
/// let ctx = ScrapeContext::with_timeout(Duration::from_secs(5));
///
/// let summary = engine.collect(&ctx, &mut samples).await.unwrap();
/// assert_eq!(summary.errors, 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScrapeEngine {
    client: RegistryClient,
}

impl ScrapeEngine {
    /// Creates an engine over a registry client. The client may have no handle.
    #[must_use]
    pub const fn new(client: RegistryClient) -> Self {
        Self { client }
    }

    /// Returns the registry client.
    #[must_use]
    pub const fn client(&self) -> &RegistryClient {
        &self.client
    }

    /// Returns the descriptors of every metric this engine can emit.
    #[must_use]
    pub fn describe(&self) -> &'static [&'static MetricDesc; 9] {
        &DESCRIPTORS
    }

    /// Runs one scrape cycle, pushing samples into `sink` as they are produced.
    ///
    /// Registry failures and malformed records never fail the scrape; they
    /// are counted in `ecr_scrape_errors_total`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the sink rejects a sample.
    pub async fn collect(
        &self,
        ctx: &ScrapeContext,
        sink: &mut dyn MetricSink,
    ) -> Result<ScrapeSummary, SinkError> {
        let start = Instant::now();
        let mut errors: u64 = 0;
        let mut repositories_scraped = 0;

        info!("Starting ECR metrics collection");

        let records = match self.client.list_repositories(ctx).await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, error_kind = %e.kind(), "Failed to list repositories");
                sink.emit(Sample::unlabeled(&REPOSITORIES_TOTAL, 0.0))?;
                errors += 1;
                return finish(sink, start, errors, 0, 0);
            }
        };

        sink.emit(Sample::unlabeled(&REPOSITORIES_TOTAL, count(records.len())))?;
        info!(count = records.len(), "Found repositories");

        let total = records.len();
        for (i, record) in records.into_iter().enumerate() {
            match self.collect_repository(ctx, sink, record, i + 1, total).await? {
                RepositoryOutcome::Scraped => repositories_scraped += 1,
                RepositoryOutcome::Malformed | RepositoryOutcome::FetchFailed => errors += 1,
            }
        }

        finish(sink, start, errors, total, repositories_scraped)
    }

    async fn collect_repository(
        &self,
        ctx: &ScrapeContext,
        sink: &mut dyn MetricSink,
        record: RepositoryRecord,
        position: usize,
        total: usize,
    ) -> Result<RepositoryOutcome, SinkError> {
        let repository = match Repository::try_from(record) {
            Ok(repository) => repository,
            Err(e) => {
                let repository = match &e {
                    RecordError::MissingName => None,
                    RecordError::MissingUri { name } => Some(name.as_str()),
                };
                error!(error = %e, repository = ?repository, "Skipping malformed repository record");
                return Ok(RepositoryOutcome::Malformed);
            }
        };

        debug!(
            repository = %repository.name,
            progress = %format_args!("{position}/{total}"),
            "Processing repository"
        );

        match self.client.list_images(ctx, &repository.name).await {
            Ok(images) => {
                let aggregate = RepositoryAggregate::from_images(&images);
                for sample in aggregate.samples(&repository) {
                    sink.emit(sample)?;
                }
                info!(
                    repository = %repository.name,
                    progress = %format_args!("{position}/{total}"),
                    images = aggregate.image_count,
                    "Processed repository"
                );
                Ok(RepositoryOutcome::Scraped)
            }
            Err(e) => {
                warn!(
                    repository = %repository.name,
                    error = %e,
                    error_kind = %e.kind(),
                    "Failed to list images"
                );
                sink.emit(Sample::repository(&IMAGES_TOTAL, &repository, 0.0))?;
                Ok(RepositoryOutcome::FetchFailed)
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn count(n: usize) -> f64 {
    n as f64
}

#[allow(clippy::cast_precision_loss)]
fn finish(
    sink: &mut dyn MetricSink,
    start: Instant,
    errors: u64,
    repositories: usize,
    repositories_scraped: usize,
) -> Result<ScrapeSummary, SinkError> {
    sink.emit(Sample::unlabeled(&SCRAPE_ERRORS_TOTAL, errors as f64))?;

    let duration = start.elapsed();
    sink.emit(Sample::unlabeled(&SCRAPE_DURATION_SECONDS, duration.as_secs_f64()))?;

    info!(
        duration_secs = duration.as_secs_f64(),
        errors,
        repositories,
        repositories_scraped,
        "ECR metrics collection completed"
    );

    Ok(ScrapeSummary {
        repositories,
        repositories_scraped,
        errors,
        duration,
    })
}
