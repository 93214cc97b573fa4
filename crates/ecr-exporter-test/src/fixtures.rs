//! Record fixtures for exporter tests.

use chrono::{DateTime, TimeZone, Utc};
use ecr_exporter_registry::{ImageDetail, RepositoryRecord};

/// Account used in fixture repository URIs.
pub const ACCOUNT_ID: &str = "123456789012";

/// Region used in fixture repository URIs.
pub const REGION: &str = "eu-west-1";

/// Returns the ECR-style URI for a repository name.
///
/// # Examples
///
/// ```rust
/// use ecr_exporter_test::repository_uri;
///
/// assert_eq!(
///     repository_uri("payments"),
///     "123456789012.dkr.ecr.eu-west-1.amazonaws.com/payments"
/// );
/// ```
#[must_use]
pub fn repository_uri(name: &str) -> String {
    format!("{ACCOUNT_ID}.dkr.ecr.{REGION}.amazonaws.com/{name}")
}

/// A well-formed repository record.
#[must_use]
pub fn repository(name: &str) -> RepositoryRecord {
    RepositoryRecord::new(name, repository_uri(name))
}

/// A repository record without a URI.
#[must_use]
pub fn repository_without_uri(name: &str) -> RepositoryRecord {
    RepositoryRecord {
        name: Some(name.to_string()),
        uri: None,
    }
}

/// A repository record without a name.
#[must_use]
pub fn repository_without_name(uri: &str) -> RepositoryRecord {
    RepositoryRecord {
        name: None,
        uri: Some(uri.to_string()),
    }
}

/// Timestamp at `secs` seconds after the Unix epoch.
///
/// # Panics
///
/// Panics if `secs` is outside chrono's representable range.
#[must_use]
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .expect("fixture timestamp out of range")
}

/// An image with only a size.
#[must_use]
pub fn sized_image(size_bytes: i64) -> ImageDetail {
    ImageDetail::default().with_size(size_bytes)
}

/// An image with every field present.
#[must_use]
pub fn image(size_bytes: i64, pushed_secs: i64, pulled_secs: i64) -> ImageDetail {
    ImageDetail::default()
        .with_size(size_bytes)
        .with_pushed_at(ts(pushed_secs))
        .with_last_pulled_at(ts(pulled_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_fixture() {
        let repo = repository("orders");
        assert_eq!(repo.name.as_deref(), Some("orders"));
        assert!(repo.uri.unwrap().ends_with("/orders"));
    }

    #[test]
    fn test_malformed_fixtures() {
        assert!(repository_without_uri("a").uri.is_none());
        assert!(repository_without_name("u").name.is_none());
    }

    #[test]
    fn test_image_fixture() {
        let img = image(10, 100, 200);
        assert_eq!(img.size_bytes, Some(10));
        assert_eq!(img.pushed_at, Some(ts(100)));
        assert_eq!(img.last_pulled_at, Some(ts(200)));
        assert!(sized_image(5).pushed_at.is_none());
    }
}
