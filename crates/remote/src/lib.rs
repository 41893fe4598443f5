//! Remote source - a cached, quota-aware integer source backed by random.org
//!
//! Draws from the remote provider are slow and rate-limited, so they never hit
//! the network one at a time. A background task keeps whole batches ready, and
//! [`RemoteBufferedSource`] keeps a local buffer of those batches, refilling it
//! before it runs dry.
//!
//! # Module Structure
//!
//! - [`service`]: the [`IntegerCacheService`] seam and [`Backoff`]
//! - [`buffered`]: [`RemoteBufferedSource`], the local double buffer
//! - [`client`]: [`RandomOrgClient`] and its background [`IntegerCache`]
//! - [`protocol`]: JSON-RPC request/response shapes
//! - [`config`]: [`RemoteConfig`] from environment variables
//!
//! # Failure model
//!
//! - provider still filling its cache: polled again with backoff, never surfaced
//! - buffer empty at pop time: rebuilt with a fresh batch, never surfaced
//! - waiting longer than the blocking timeout, or a request longer than the HTTP
//!   timeout: [`SourceError::Timeout`]
//! - provider error objects: [`SourceError::Remote`]

pub mod buffered;
pub mod client;
pub mod config;
pub mod protocol;
pub mod service;

pub use buffered::{BufferConfig, RemoteBufferedSource};
pub use client::{IntegerCache, RandomOrgClient, RandomOrgConfig, DEFAULT_ENDPOINT};
pub use config::RemoteConfig;
pub use service::{Backoff, IntegerCacheService};

use tetromino_feed_core::SourceError;
use tracing::info;

/// Connect a buffered source to random.org using `config`.
///
/// Blocks until the initial fill completes or the blocking timeout elapses.
pub fn open_random_org(
    config: &RemoteConfig,
) -> Result<RemoteBufferedSource<IntegerCache>, SourceError> {
    let client_config = config.client_config().ok_or_else(|| {
        SourceError::InvalidConfig("TETROMINO_REMOTE_API_KEY is not set".to_string())
    })?;
    let buffer = config.buffer_config();
    buffer.validate()?;

    info!(
        endpoint = %client_config.endpoint,
        cache_len = buffer.cache_len,
        threshold = buffer.refill_threshold,
        "connecting remote source"
    );

    let client = RandomOrgClient::new(client_config)?;
    let cache = client.create_integer_cache(
        buffer.cache_len,
        i64::from(buffer.lo),
        i64::from(buffer.hi),
        config.prefetch_batches,
    );
    RemoteBufferedSource::connect(cache, buffer)
}
