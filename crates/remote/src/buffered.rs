//! Remote buffered source - a local double buffer in front of a rate-limited provider
//!
//! Draws are served from a local buffer. Whenever the buffer is at or below the
//! refill threshold, the next draw first appends one fresh batch from the
//! provider. With a threshold no larger than the batch length, the buffer stays
//! under two batches.
//!
//! "Not ready yet" answers from the provider are absorbed here: the source polls
//! again with exponential backoff until the blocking timeout runs out, and only
//! then reports [`SourceError::Timeout`].

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use tetromino_feed_types::{
    PieceId, DEFAULT_BLOCKING_TIMEOUT_SECS, DEFAULT_CACHE_LEN, PIECE_ID_MAX, PIECE_ID_MIN,
};
use tetromino_feed_core::{IntegerSource, SourceError};

use crate::service::{Backoff, IntegerCacheService};

/// Buffering parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Batch length L requested from the provider.
    pub cache_len: usize,
    /// Refill when the buffer holds this many values or fewer. Must be `<= cache_len`.
    pub refill_threshold: usize,
    /// Inclusive range every value must fall in.
    pub lo: PieceId,
    pub hi: PieceId,
    /// Total time to wait for the provider to have a batch ready.
    pub blocking_timeout: Duration,
    pub backoff: Backoff,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            cache_len: DEFAULT_CACHE_LEN,
            refill_threshold: DEFAULT_CACHE_LEN,
            lo: PIECE_ID_MIN,
            hi: PIECE_ID_MAX,
            blocking_timeout: Duration::from_secs(DEFAULT_BLOCKING_TIMEOUT_SECS),
            backoff: Backoff::default(),
        }
    }
}

impl BufferConfig {
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.cache_len == 0 {
            return Err(SourceError::InvalidConfig(
                "cache length must be at least 1".to_string(),
            ));
        }
        if self.refill_threshold > self.cache_len {
            return Err(SourceError::InvalidConfig(format!(
                "refill threshold {} exceeds cache length {}",
                self.refill_threshold, self.cache_len
            )));
        }
        if self.lo > self.hi {
            return Err(SourceError::InvalidConfig(format!(
                "empty range [{}, {}]",
                self.lo, self.hi
            )));
        }
        Ok(())
    }
}

pub struct RemoteBufferedSource<S> {
    service: S,
    buffer: VecDeque<PieceId>,
    config: BufferConfig,
    last_quota: Option<i64>,
    fetches: u64,
}

impl<S: IntegerCacheService> RemoteBufferedSource<S> {
    /// Validate `config` and perform the initial fill.
    ///
    /// Blocks until the provider has a batch ready or `blocking_timeout` elapses.
    pub fn connect(service: S, config: BufferConfig) -> Result<Self, SourceError> {
        config.validate()?;

        let mut source = Self {
            service,
            buffer: VecDeque::with_capacity(config.cache_len * 2),
            config,
            last_quota: None,
            fetches: 0,
        };

        let batch = source.fetch_ready("initial fill")?;
        source.buffer.extend(batch);
        info!(
            buffered = source.buffer.len(),
            threshold = source.config.refill_threshold,
            "remote source ready"
        );
        Ok(source)
    }

    /// Remaining provider allowance. Does not touch the buffer.
    pub fn check_quota(&mut self) -> Result<i64, SourceError> {
        let quota = self.service.quota()?;
        debug!(quota, "remote quota");
        self.last_quota = Some(quota);
        Ok(quota)
    }

    /// Quota seen by the last successful [`check_quota`](Self::check_quota).
    pub fn last_quota(&self) -> Option<i64> {
        self.last_quota
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Batches taken from the provider so far, initial fill included.
    pub fn fetches(&self) -> u64 {
        self.fetches
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    pub fn into_service(self) -> S {
        self.service
    }

    /// Poll the provider until a batch is ready, backing off between polls.
    fn fetch_ready(&mut self, operation: &'static str) -> Result<Vec<PieceId>, SourceError> {
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            if let Some(batch) = self.service.fetch()? {
                self.fetches += 1;
                return self.check_batch(batch);
            }

            let elapsed = started.elapsed();
            if elapsed >= self.config.blocking_timeout {
                warn!(operation, attempts = attempt.saturating_add(1), ?elapsed, "remote cache never became ready");
                return Err(SourceError::Timeout { operation, elapsed });
            }

            let delay = self
                .config
                .backoff
                .delay(attempt)
                .min(self.config.blocking_timeout - elapsed);
            debug!(operation, attempt, ?delay, "remote cache not ready");
            thread::sleep(delay);
            attempt = attempt.saturating_add(1);
        }
    }

    fn check_batch(&self, batch: Vec<i64>) -> Result<Vec<PieceId>, SourceError> {
        if batch.is_empty() {
            return Err(SourceError::Protocol("provider returned an empty batch".to_string()));
        }

        let (lo, hi) = (self.config.lo, self.config.hi);
        batch
            .into_iter()
            .map(|value| {
                if value >= i64::from(lo) && value <= i64::from(hi) {
                    Ok(value as PieceId)
                } else {
                    Err(SourceError::OutOfRange { value, lo, hi })
                }
            })
            .collect()
    }
}

impl<S: IntegerCacheService> IntegerSource for RemoteBufferedSource<S> {
    fn draw(&mut self) -> Result<PieceId, SourceError> {
        if self.buffer.len() <= self.config.refill_threshold {
            debug!(buffered = self.buffer.len(), "extending buffer");
            let batch = self.fetch_ready("refill")?;
            self.buffer.extend(batch);
        }

        if let Some(value) = self.buffer.pop_front() {
            return Ok(value);
        }

        warn!("buffer empty at pop, rebuilding");
        self.buffer = self.fetch_ready("rebuild")?.into();
        self.buffer
            .pop_front()
            .ok_or_else(|| SourceError::Protocol("rebuilt buffer is empty".to_string()))
    }
}

impl<S> std::fmt::Debug for RemoteBufferedSource<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBufferedSource")
            .field("buffered", &self.buffer.len())
            .field("config", &self.config)
            .field("last_quota", &self.last_quota)
            .field("fetches", &self.fetches)
            .finish()
    }
}
