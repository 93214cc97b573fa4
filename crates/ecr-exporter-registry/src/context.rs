//! Deadline shared by every remote call of one scrape.

use std::time::Duration;

use tokio::time::Instant;

/// Deadline used when `now + timeout` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Caller-supplied deadline for one scrape cycle.
///
/// Cheap to copy; concurrent scrapes each hold their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeContext {
    deadline: Instant,
}

impl ScrapeContext {
    /// Creates a context that expires at `deadline`.
    #[must_use]
    pub const fn new(deadline: Instant) -> Self {
        Self { deadline }
    }

    /// Creates a context that expires `timeout` from now.
    ///
    /// Timeouts too large to represent are capped at about thirty years.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let now = Instant::now();
        Self::new(now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE))
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns the time left before the deadline, zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns true once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}
