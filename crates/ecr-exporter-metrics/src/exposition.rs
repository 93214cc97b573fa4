//! Prometheus text exposition.

use std::collections::HashMap;

use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::descriptor::{MetricKind, DESCRIPTORS};
use crate::sink::{MetricSink, Sample, SinkError};

enum Family {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

/// Sink that records samples into a Prometheus registry.
///
/// Create one per scrape so no value outlives the scrape that produced it.
/// Metrics without samples are left out of the encoded output.
///
/// # Examples
///
/// ```
/// use ecr_exporter_metrics::{descriptor, MetricSink, PrometheusSink, Sample};
///
/// let mut sink = PrometheusSink::new().unwrap();
/// sink.emit(Sample::unlabeled(&descriptor::REPOSITORIES_TOTAL, 3.0)).unwrap();
///
/// let text = sink.encode().unwrap();
/// assert!(text.contains("ecr_repositories_total 3"));
/// ```
pub struct PrometheusSink {
    registry: Registry,
    families: HashMap<&'static str, Family>,
}

impl std::fmt::Debug for PrometheusSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusSink")
            .field("families", &self.families.len())
            .finish_non_exhaustive()
    }
}

impl PrometheusSink {
    /// Content type of [`encode`](Self::encode) output.
    pub const CONTENT_TYPE: &'static str = prometheus::TEXT_FORMAT;

    /// Creates a sink with every exported metric registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a descriptor is rejected by the Prometheus client.
    pub fn new() -> Result<Self, SinkError> {
        let registry = Registry::new();
        let mut families = HashMap::with_capacity(DESCRIPTORS.len());

        for desc in DESCRIPTORS {
            let opts = Opts::new(desc.name, desc.help);
            let family = match desc.kind {
                MetricKind::Gauge => {
                    let vec = GaugeVec::new(opts, desc.labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    Family::Gauge(vec)
                }
                MetricKind::Counter => {
                    let vec = CounterVec::new(opts, desc.labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    Family::Counter(vec)
                }
            };
            families.insert(desc.name, family);
        }

        Ok(Self { registry, families })
    }

    /// Renders every recorded sample in the text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode(&self) -> Result<String, SinkError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl MetricSink for PrometheusSink {
    fn emit(&mut self, sample: Sample) -> Result<(), SinkError> {
        let name = sample.desc.name;
        let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();

        match self.families.get(name) {
            Some(Family::Gauge(vec)) => {
                vec.get_metric_with_label_values(&labels)?.set(sample.value);
            }
            Some(Family::Counter(vec)) => {
                let counter = vec.get_metric_with_label_values(&labels)?;
                counter.reset();
                counter.inc_by(sample.value.max(0.0));
            }
            None => return Err(SinkError::UnknownMetric { name }),
        }
        Ok(())
    }
}
