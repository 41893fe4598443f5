//! Integer-cache service seam
//!
//! The buffered source talks to the remote provider only through
//! [`IntegerCacheService`], so tests can drive it with scripted fakes.

use std::time::Duration;

use tetromino_feed_core::SourceError;

/// A remote cache of pre-generated integer batches.
pub trait IntegerCacheService: Send {
    /// Take the next ready batch.
    ///
    /// `Ok(None)` means the provider is still filling its cache; try again later.
    fn fetch(&mut self) -> Result<Option<Vec<i64>>, SourceError>;

    /// Remaining usage allowance reported by the provider.
    fn quota(&mut self) -> Result<i64, SourceError>;
}

impl<S: IntegerCacheService + ?Sized> IntegerCacheService for Box<S> {
    fn fetch(&mut self) -> Result<Option<Vec<i64>>, SourceError> {
        (**self).fetch()
    }

    fn quota(&mut self) -> Result<i64, SourceError> {
        (**self).quota()
    }
}

/// Exponential backoff between "not ready" polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }

    /// Delay before poll number `attempt + 1`: `initial * 2^attempt`, capped at `max`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(31);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(50), Duration::from_secs(5))
    }
}
