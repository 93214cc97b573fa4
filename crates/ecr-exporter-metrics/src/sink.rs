//! Metric samples and the sinks they are pushed into.

use ecr_exporter_registry::Repository;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::descriptor::MetricDesc;

/// One value of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Metric this sample belongs to.
    pub desc: &'static MetricDesc,
    /// Label values, in the order of `desc.labels`.
    pub labels: Vec<String>,
    /// Sample value.
    pub value: f64,
}

impl Sample {
    /// Creates a sample of a metric without labels.
    #[must_use]
    pub fn unlabeled(desc: &'static MetricDesc, value: f64) -> Self {
        debug_assert!(desc.labels.is_empty(), "{} requires labels", desc.name);
        Self {
            desc,
            labels: Vec::new(),
            value,
        }
    }

    /// Creates a sample labelled by repository name and URI.
    #[must_use]
    pub fn repository(desc: &'static MetricDesc, repository: &Repository, value: f64) -> Self {
        debug_assert_eq!(desc.labels.len(), 2, "{} is not per-repository", desc.name);
        Self {
            desc,
            labels: vec![repository.name.clone(), repository.uri.clone()],
            value,
        }
    }

    /// Returns the metric name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.desc.name
    }

    /// Returns the value of the named label.
    #[must_use]
    pub fn label(&self, name: &str) -> Option<&str> {
        self.desc
            .labels
            .iter()
            .position(|label| *label == name)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }
}

/// Errors from a metric sink. Any of these aborts the scrape.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The receiving side is gone.
    #[error("Metric sink is closed")]
    Closed,

    /// The sink does not know the metric.
    #[error("Unknown metric: {name}")]
    UnknownMetric {
        /// Metric name.
        name: &'static str,
    },

    /// The Prometheus client rejected a metric or sample.
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// The encoded output is not valid UTF-8.
    #[error("Encoded metrics are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Destination for samples as they are produced.
pub trait MetricSink: Send {
    /// Accepts one sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink can no longer accept samples.
    fn emit(&mut self, sample: Sample) -> Result<(), SinkError>;
}

impl MetricSink for Vec<Sample> {
    fn emit(&mut self, sample: Sample) -> Result<(), SinkError> {
        self.push(sample);
        Ok(())
    }
}

/// Sink that forwards samples over an unbounded channel.
///
/// Lets the receiver start serializing before the scrape finishes.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Sample>,
}

impl ChannelSink {
    /// Creates a sink and the receiver for its samples.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Sample>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MetricSink for ChannelSink {
    fn emit(&mut self, sample: Sample) -> Result<(), SinkError> {
        self.tx.send(sample).map_err(|_| SinkError::Closed)
    }
}
