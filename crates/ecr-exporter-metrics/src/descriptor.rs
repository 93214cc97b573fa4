//! The fixed metric schema.

use std::fmt;

/// Namespace prefixed to every metric name.
pub const NAMESPACE: &str = "ecr";

/// Label names of per-repository metrics, in value order.
pub const REPOSITORY_LABELS: &[&str] = &["repository_name", "repository_uri"];

/// Prometheus value type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Point-in-time value.
    Gauge,
    /// Monotonic count.
    Counter,
}

impl MetricKind {
    /// Returns the exposition-format type name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gauge => "gauge",
            Self::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of one exported metric.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MetricDesc {
    /// Fully-qualified metric name.
    pub name: &'static str,
    /// Help text.
    pub help: &'static str,
    /// Value type.
    pub kind: MetricKind,
    /// Variable label names.
    pub labels: &'static [&'static str],
}

impl MetricDesc {
    /// Returns true if samples of this metric carry repository labels.
    #[must_use]
    pub const fn is_per_repository(&self) -> bool {
        !self.labels.is_empty()
    }
}

/// Number of repositories in the registry.
pub static REPOSITORIES_TOTAL: MetricDesc = MetricDesc {
    name: "ecr_repositories_total",
    help: "Total number of ECR repositories",
    kind: MetricKind::Gauge,
    labels: &[],
};

/// Number of images in a repository.
pub static IMAGES_TOTAL: MetricDesc = MetricDesc {
    name: "ecr_images_total",
    help: "Number of images in ECR repository",
    kind: MetricKind::Gauge,
    labels: REPOSITORY_LABELS,
};

/// Smallest image size in a repository.
pub static IMAGE_SIZE_MIN_BYTES: MetricDesc = MetricDesc {
    name: "ecr_image_size_min_bytes",
    help: "Minimum image size in repository (bytes)",
    kind: MetricKind::Gauge,
    labels: REPOSITORY_LABELS,
};

/// Largest image size in a repository.
pub static IMAGE_SIZE_MAX_BYTES: MetricDesc = MetricDesc {
    name: "ecr_image_size_max_bytes",
    help: "Maximum image size in repository (bytes)",
    kind: MetricKind::Gauge,
    labels: REPOSITORY_LABELS,
};

/// Mean image size over images that report a size.
pub static IMAGE_SIZE_AVG_BYTES: MetricDesc = MetricDesc {
    name: "ecr_image_size_avg_bytes",
    help: "Average image size in repository (bytes)",
    kind: MetricKind::Gauge,
    labels: REPOSITORY_LABELS,
};

/// Most recent push, as Unix seconds.
pub static LATEST_PUSH_TIMESTAMP: MetricDesc = MetricDesc {
    name: "ecr_latest_push_timestamp",
    help: "Timestamp of latest image push",
    kind: MetricKind::Gauge,
    labels: REPOSITORY_LABELS,
};

/// Most recent recorded pull, as Unix seconds.
pub static LATEST_PULL_TIMESTAMP: MetricDesc = MetricDesc {
    name: "ecr_latest_pull_timestamp",
    help: "Timestamp of latest image pull",
    kind: MetricKind::Gauge,
    labels: REPOSITORY_LABELS,
};

/// Errors encountered during one scrape.
pub static SCRAPE_ERRORS_TOTAL: MetricDesc = MetricDesc {
    name: "ecr_scrape_errors_total",
    help: "Total number of scrape errors",
    kind: MetricKind::Counter,
    labels: &[],
};

/// Wall-clock duration of one scrape.
pub static SCRAPE_DURATION_SECONDS: MetricDesc = MetricDesc {
    name: "ecr_scrape_duration_seconds",
    help: "Duration of the scrape",
    kind: MetricKind::Gauge,
    labels: &[],
};

/// Every exported metric, in describe order.
pub static DESCRIPTORS: [&MetricDesc; 9] = [
    &REPOSITORIES_TOTAL,
    &IMAGES_TOTAL,
    &IMAGE_SIZE_MAX_BYTES,
    &IMAGE_SIZE_MIN_BYTES,
    &IMAGE_SIZE_AVG_BYTES,
    &LATEST_PUSH_TIMESTAMP,
    &LATEST_PULL_TIMESTAMP,
    &SCRAPE_ERRORS_TOTAL,
    &SCRAPE_DURATION_SECONDS,
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_nine_unique_descriptors() {
        let names: HashSet<_> = DESCRIPTORS.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn test_names_are_namespaced() {
        for desc in DESCRIPTORS {
            assert!(desc.name.starts_with(&format!("{NAMESPACE}_")), "{}", desc.name);
            assert!(!desc.help.is_empty());
        }
    }

    #[test]
    fn test_label_sets() {
        let unlabeled: Vec<_> = DESCRIPTORS
            .iter()
            .filter(|d| !d.is_per_repository())
            .map(|d| d.name)
            .collect();
        assert_eq!(
            unlabeled,
            [
                "ecr_repositories_total",
                "ecr_scrape_errors_total",
                "ecr_scrape_duration_seconds"
            ]
        );
        assert_eq!(IMAGES_TOTAL.labels, ["repository_name", "repository_uri"]);
    }

    #[test]
    fn test_only_errors_is_counter() {
        let counters: Vec<_> = DESCRIPTORS
            .iter()
            .filter(|d| d.kind == MetricKind::Counter)
            .collect();
        assert_eq!(counters.len(), 1);
        assert_eq!(counters[0].name, "ecr_scrape_errors_total");
        assert_eq!(MetricKind::Counter.to_string(), "counter");
    }
}
