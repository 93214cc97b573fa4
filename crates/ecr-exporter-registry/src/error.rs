//! Error types for registry operations.

use std::fmt;

use thiserror::Error;

/// Coarse category of a registry failure.
///
/// Callers count every category the same way, but operators need to tell
/// a missing repository apart from rate limiting in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested resource does not exist.
    NotFound,
    /// The registry rejected the call because of rate limits.
    Throttled,
    /// Network, timeout, or other failure that may succeed on a later scrape.
    Transient,
    /// Anything else.
    Other,
}

impl ErrorKind {
    /// Returns the label used in structured log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Throttled => "throttled",
            Self::Transient => "transient",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by a registry API call.
#[derive(Debug, Clone, Error)]
pub enum RegistryApiError {
    /// The repository (or registry) does not exist.
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Name of the missing resource.
        resource: String,
    },

    /// Rate limited by the registry.
    #[error("Request throttled by registry: {message}")]
    Throttled {
        /// Error message.
        message: String,
    },

    /// Network-level or otherwise transient failure.
    #[error("Transient registry failure: {message}")]
    Transient {
        /// Error message.
        message: String,
    },

    /// The scrape deadline elapsed before the call completed.
    #[error("Operation timed out: {operation}")]
    Timeout {
        /// Operation that was in flight.
        operation: String,
    },

    /// No registry client handle was configured.
    #[error("Registry client is not available")]
    ClientUnavailable,

    /// Any other failure reported by the registry.
    #[error("Registry API error: {message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl RegistryApiError {
    /// Returns the failure category.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecr_exporter_registry::{ErrorKind, RegistryApiError};
    ///
    /// let err = RegistryApiError::Timeout { operation: "DescribeImages".to_string() };
    /// assert_eq!(err.kind(), ErrorKind::Transient);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Throttled { .. } => ErrorKind::Throttled,
            Self::Transient { .. } | Self::Timeout { .. } => ErrorKind::Transient,
            Self::ClientUnavailable | Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Returns true if the same call could succeed on a later scrape.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Throttled { .. } | Self::Transient { .. } | Self::Timeout { .. }
        )
    }
}

/// A repository record lacks a field needed to identify it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Repository name is missing.
    #[error("Repository name is missing")]
    MissingName,

    /// Repository URI is missing.
    #[error("Repository URI is missing for repository {name}")]
    MissingUri {
        /// Name of the repository without a URI.
        name: String,
    },
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Page size outside the range accepted by the registry.
    #[error("Invalid page size {value}: must be between 1 and {max}")]
    InvalidPageSize {
        /// Rejected value.
        value: i32,
        /// Largest accepted value.
        max: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_categories() {
        assert_eq!(
            RegistryApiError::NotFound {
                resource: "app".to_string()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RegistryApiError::Throttled {
                message: "slow down".to_string()
            }
            .kind(),
            ErrorKind::Throttled
        );
        assert_eq!(RegistryApiError::ClientUnavailable.kind(), ErrorKind::Other);
        assert_eq!(
            RegistryApiError::Timeout {
                operation: "DescribeRepositories".to_string()
            }
            .kind(),
            ErrorKind::Transient
        );
    }

    #[test]
    fn test_retryable() {
        assert!(RegistryApiError::Throttled {
            message: String::new()
        }
        .is_retryable());
        assert!(!RegistryApiError::ClientUnavailable.is_retryable());
        assert!(!RegistryApiError::NotFound {
            resource: "x".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = RegistryApiError::NotFound {
            resource: "payments".to_string(),
        };
        assert_eq!(err.to_string(), "Resource not found: payments");
        assert_eq!(ErrorKind::Throttled.to_string(), "throttled");

        let err = RecordError::MissingUri {
            name: "payments".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Repository URI is missing for repository payments"
        );
    }
}
