//! Records returned by the registry API.

use chrono::{DateTime, Utc};

use crate::error::RecordError;

/// A repository as reported by the registry, before validation.
///
/// Both fields are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// Repository name.
    pub name: Option<String>,
    /// Repository URI.
    pub uri: Option<String>,
}

impl RepositoryRecord {
    /// Creates a record with both identifying fields present.
    #[must_use]
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            uri: Some(uri.into()),
        }
    }
}

/// A repository with both identifying fields present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    /// Repository name.
    pub name: String,
    /// Repository URI.
    pub uri: String,
}

impl TryFrom<RepositoryRecord> for Repository {
    type Error = RecordError;

    /// Validates a raw record. The name is checked before the URI.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecr_exporter_registry::{RecordError, Repository, RepositoryRecord};
    ///
    /// let repo = Repository::try_from(RepositoryRecord::new("app", "uri/app")).unwrap();
    /// assert_eq!(repo.name, "app");
    ///
    /// let missing = RepositoryRecord { name: Some("app".into()), uri: None };
    /// assert!(matches!(Repository::try_from(missing), Err(RecordError::MissingUri { .. })));
    /// ```
    fn try_from(record: RepositoryRecord) -> Result<Self, Self::Error> {
        let name = record.name.ok_or(RecordError::MissingName)?;
        let uri = record.uri.ok_or_else(|| RecordError::MissingUri { name: name.clone() })?;
        Ok(Self { name, uri })
    }
}

/// One image in a repository. Every field may be omitted upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDetail {
    /// Compressed image size in bytes.
    pub size_bytes: Option<i64>,
    /// When the image was pushed.
    pub pushed_at: Option<DateTime<Utc>>,
    /// Last recorded pull; absent for images never pulled.
    pub last_pulled_at: Option<DateTime<Utc>>,
}

impl ImageDetail {
    /// Sets the image size.
    #[must_use]
    pub const fn with_size(mut self, size_bytes: i64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Sets the push timestamp.
    #[must_use]
    pub const fn with_pushed_at(mut self, pushed_at: DateTime<Utc>) -> Self {
        self.pushed_at = Some(pushed_at);
        self
    }

    /// Sets the last pull timestamp.
    #[must_use]
    pub const fn with_last_pulled_at(mut self, pulled_at: DateTime<Utc>) -> Self {
        self.last_pulled_at = Some(pulled_at);
        self
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Records in this page, in registry order.
    pub items: Vec<T>,
    /// Continuation token; `None` on the last page.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Creates a final page.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// Creates a page followed by more pages.
    #[must_use]
    pub fn more(items: Vec<T>, next_token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(next_token.into()),
        }
    }

    /// Returns the continuation token, treating an empty token as absent.
    #[must_use]
    pub fn continuation(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_missing_name() {
        let record = RepositoryRecord {
            name: None,
            uri: Some("uri".to_string()),
        };
        assert_eq!(Repository::try_from(record), Err(RecordError::MissingName));
    }

    #[test]
    fn test_repository_missing_both_reports_name() {
        let record = RepositoryRecord::default();
        assert_eq!(Repository::try_from(record), Err(RecordError::MissingName));
    }

    #[test]
    fn test_repository_missing_uri() {
        let record = RepositoryRecord {
            name: Some("orders".to_string()),
            uri: None,
        };
        assert_eq!(
            Repository::try_from(record),
            Err(RecordError::MissingUri {
                name: "orders".to_string()
            })
        );
    }

    #[test]
    fn test_page_continuation() {
        let page: Page<u8> = Page::more(vec![1], "t1");
        assert_eq!(page.continuation(), Some("t1"));

        let page: Page<u8> = Page::more(vec![1], "");
        assert_eq!(page.continuation(), None);

        let page: Page<u8> = Page::last(vec![]);
        assert_eq!(page.continuation(), None);
    }
}
