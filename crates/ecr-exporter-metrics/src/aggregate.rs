//! Per-repository statistics over a list of images.

use chrono::{DateTime, Utc};
use ecr_exporter_registry::{ImageDetail, Repository};

use crate::descriptor::{
    IMAGES_TOTAL, IMAGE_SIZE_AVG_BYTES, IMAGE_SIZE_MAX_BYTES, IMAGE_SIZE_MIN_BYTES,
    LATEST_PULL_TIMESTAMP, LATEST_PUSH_TIMESTAMP,
};
use crate::sink::Sample;

/// Size statistics over images that report a size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeStats {
    /// Smallest size in bytes.
    pub min: i64,
    /// Largest size in bytes.
    pub max: i64,
    /// Sum of sizes divided by the number of sized images.
    pub avg: f64,
    /// Number of images that reported a size.
    pub count: usize,
}

/// Statistics for one repository, recomputed every scrape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryAggregate {
    /// Number of images, including those without a size.
    pub image_count: usize,
    /// `None` when no image reported a size.
    pub sizes: Option<SizeStats>,
    /// Latest push time, if any image reported one.
    pub latest_push: Option<DateTime<Utc>>,
    /// Latest recorded pull time, if any image reported one.
    pub latest_pull: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct SizeAccumulator {
    min: i64,
    max: i64,
    sum: i128,
    count: usize,
}

impl SizeAccumulator {
    fn observe(&mut self, size: i64) {
        if self.count == 0 {
            self.min = size;
            self.max = size;
        } else {
            self.min = self.min.min(size);
            self.max = self.max.max(size);
        }
        self.sum += i128::from(size);
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> Option<SizeStats> {
        (self.count > 0).then(|| SizeStats {
            min: self.min,
            max: self.max,
            avg: self.sum as f64 / self.count as f64,
            count: self.count,
        })
    }
}

/// Keeps `held` unless `candidate` is strictly later.
fn later(held: Option<DateTime<Utc>>, candidate: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (held, candidate) {
        (Some(h), Some(c)) if c > h => Some(c),
        (None, c) => c,
        (h, _) => h,
    }
}

impl RepositoryAggregate {
    /// Aggregates images in the order the registry returned them.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecr_exporter_metrics::RepositoryAggregate;
    /// use ecr_exporter_registry::ImageDetail;
    ///
    /// let images = [
    ///     ImageDetail::default().with_size(100),
    ///     ImageDetail::default().with_size(300),
    ///     ImageDetail::default(),
    /// ];
    /// let agg = RepositoryAggregate::from_images(&images);
    /// assert_eq!(agg.image_count, 3);
    /// let sizes = agg.sizes.unwrap();
    /// assert_eq!((sizes.min, sizes.max, sizes.avg), (100, 300, 200.0));
    /// ```
    #[must_use]
    pub fn from_images(images: &[ImageDetail]) -> Self {
        let mut sizes = SizeAccumulator::default();
        let mut latest_push = None;
        let mut latest_pull = None;

        for image in images {
            if let Some(size) = image.size_bytes {
                sizes.observe(size);
            }
            latest_push = later(latest_push, image.pushed_at);
            latest_pull = later(latest_pull, image.last_pulled_at);
        }

        Self {
            image_count: images.len(),
            sizes: sizes.finish(),
            latest_push,
            latest_pull,
        }
    }

    /// Returns the samples for this repository in emission order.
    ///
    /// The image count is always present; size and timestamp samples only
    /// when there is data behind them.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn samples(&self, repository: &Repository) -> Vec<Sample> {
        let mut samples = vec![Sample::repository(
            &IMAGES_TOTAL,
            repository,
            self.image_count as f64,
        )];

        if let Some(sizes) = self.sizes {
            samples.push(Sample::repository(&IMAGE_SIZE_MIN_BYTES, repository, sizes.min as f64));
            samples.push(Sample::repository(&IMAGE_SIZE_MAX_BYTES, repository, sizes.max as f64));
            samples.push(Sample::repository(&IMAGE_SIZE_AVG_BYTES, repository, sizes.avg));
        }
        if let Some(pushed) = self.latest_push {
            samples.push(Sample::repository(
                &LATEST_PUSH_TIMESTAMP,
                repository,
                pushed.timestamp() as f64,
            ));
        }
        if let Some(pulled) = self.latest_pull {
            samples.push(Sample::repository(
                &LATEST_PULL_TIMESTAMP,
                repository,
                pulled.timestamp() as f64,
            ));
        }

        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn repo() -> Repository {
        Repository {
            name: "a".to_string(),
            uri: "u1".to_string(),
        }
    }

    #[test]
    fn test_empty_images() {
        let agg = RepositoryAggregate::from_images(&[]);
        assert_eq!(agg, RepositoryAggregate::default());

        let samples = agg.samples(&repo());
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name(), "ecr_images_total");
        assert_eq!(samples[0].value, 0.0);
    }

    #[test]
    fn test_two_images_scenario() {
        let images = [
            ImageDetail::default().with_size(100).with_pushed_at(ts(1_000)),
            ImageDetail::default().with_size(300).with_pushed_at(ts(2_000)),
        ];
        let agg = RepositoryAggregate::from_images(&images);

        assert_eq!(agg.image_count, 2);
        assert_eq!(
            agg.sizes,
            Some(SizeStats {
                min: 100,
                max: 300,
                avg: 200.0,
                count: 2
            })
        );
        assert_eq!(agg.latest_push, Some(ts(2_000)));
        assert_eq!(agg.latest_pull, None);

        let names: Vec<_> = agg.samples(&repo()).iter().map(Sample::name).collect();
        assert_eq!(
            names,
            [
                "ecr_images_total",
                "ecr_image_size_min_bytes",
                "ecr_image_size_max_bytes",
                "ecr_image_size_avg_bytes",
                "ecr_latest_push_timestamp"
            ]
        );
    }

    #[test]
    fn test_average_excludes_unsized_images() {
        let images = [
            ImageDetail::default().with_size(10),
            ImageDetail::default(),
            ImageDetail::default().with_size(21),
        ];
        let agg = RepositoryAggregate::from_images(&images);
        assert_eq!(agg.image_count, 3);
        let sizes = agg.sizes.unwrap();
        assert_eq!(sizes.count, 2);
        assert!((sizes.avg - 15.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_sizes_omits_size_samples() {
        let images = [ImageDetail::default().with_last_pulled_at(ts(50))];
        let agg = RepositoryAggregate::from_images(&images);
        assert!(agg.sizes.is_none());

        let names: Vec<_> = agg.samples(&repo()).iter().map(Sample::name).collect();
        assert_eq!(names, ["ecr_images_total", "ecr_latest_pull_timestamp"]);
    }

    #[test]
    fn test_latest_is_order_independent_maximum() {
        let images = [
            ImageDetail::default().with_pushed_at(ts(300)).with_last_pulled_at(ts(10)),
            ImageDetail::default().with_pushed_at(ts(900)),
            ImageDetail::default().with_pushed_at(ts(500)).with_last_pulled_at(ts(40)),
        ];
        let agg = RepositoryAggregate::from_images(&images);
        assert_eq!(agg.latest_push, Some(ts(900)));
        assert_eq!(agg.latest_pull, Some(ts(40)));
    }

    #[test]
    fn test_later_keeps_held_on_tie() {
        assert_eq!(later(Some(ts(5)), Some(ts(5))), Some(ts(5)));
        assert_eq!(later(Some(ts(5)), Some(ts(4))), Some(ts(5)));
        assert_eq!(later(Some(ts(5)), None), Some(ts(5)));
        assert_eq!(later(None, Some(ts(4))), Some(ts(4)));
        assert_eq!(later(None, None), None);
    }

    #[test]
    fn test_pre_epoch_timestamps_are_reported() {
        let images = [ImageDetail::default().with_pushed_at(ts(-100))];
        let agg = RepositoryAggregate::from_images(&images);
        assert_eq!(agg.latest_push, Some(ts(-100)));
    }

    #[test]
    fn test_sum_does_not_overflow() {
        let images = [
            ImageDetail::default().with_size(i64::MAX),
            ImageDetail::default().with_size(i64::MAX),
        ];
        let sizes = RepositoryAggregate::from_images(&images).sizes.unwrap();
        assert_eq!(sizes.max, i64::MAX);
        assert!(sizes.avg > 9.0e18);
    }
}
