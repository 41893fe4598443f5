//! Remote source configuration
//!
//! Read from environment-style variables (the facade's `FeedConfig::from_env`
//! passes the process environment), falling back to defaults for anything
//! missing or unparseable.
//!
//! - `TETROMINO_REMOTE_API_KEY`: random.org API key (required to connect)
//! - `TETROMINO_REMOTE_ENDPOINT`: JSON-RPC endpoint
//! - `TETROMINO_REMOTE_CACHE_LEN`: integers per batch (default: 20)
//! - `TETROMINO_REMOTE_THRESHOLD`: refill threshold (default: cache length)
//! - `TETROMINO_REMOTE_PREFETCH`: batches kept ready by the background task (default: 2)
//! - `TETROMINO_REMOTE_BLOCKING_TIMEOUT_SECS`: wait for ready data (default: 3600)
//! - `TETROMINO_REMOTE_HTTP_TIMEOUT_SECS`: single request timeout (default: 30)

use std::time::Duration;

use tetromino_feed_types::{
    PieceId, DEFAULT_BLOCKING_TIMEOUT_SECS, DEFAULT_CACHE_LEN, DEFAULT_HTTP_TIMEOUT_SECS,
    PIECE_ID_MAX, PIECE_ID_MIN,
};

use crate::buffered::BufferConfig;
use crate::client::{RandomOrgConfig, DEFAULT_ENDPOINT};
use crate::service::Backoff;

/// Everything needed to open a remote-backed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub cache_len: usize,
    pub refill_threshold: usize,
    pub prefetch_batches: usize,
    pub lo: PieceId,
    pub hi: PieceId,
    pub blocking_timeout: Duration,
    pub http_timeout: Duration,
    pub backoff: Backoff,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cache_len: DEFAULT_CACHE_LEN,
            refill_threshold: DEFAULT_CACHE_LEN,
            prefetch_batches: 2,
            lo: PIECE_ID_MIN,
            hi: PIECE_ID_MAX,
            blocking_timeout: Duration::from_secs(DEFAULT_BLOCKING_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            backoff: Backoff::default(),
        }
    }
}

impl RemoteConfig {
    /// Build from a variable lookup (`std::env::var` in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        let api_key = lookup("TETROMINO_REMOTE_API_KEY")
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        let endpoint = lookup("TETROMINO_REMOTE_ENDPOINT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.endpoint);

        let cache_len = parse("TETROMINO_REMOTE_CACHE_LEN")
            .map(|v| v as usize)
            .filter(|v| *v > 0)
            .unwrap_or(defaults.cache_len);

        let refill_threshold = parse("TETROMINO_REMOTE_THRESHOLD")
            .map(|v| v as usize)
            .unwrap_or(cache_len);

        let prefetch_batches = parse("TETROMINO_REMOTE_PREFETCH")
            .map(|v| v as usize)
            .filter(|v| *v > 0)
            .unwrap_or(defaults.prefetch_batches);

        let blocking_timeout = parse("TETROMINO_REMOTE_BLOCKING_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.blocking_timeout);

        let http_timeout = parse("TETROMINO_REMOTE_HTTP_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Self {
            api_key,
            endpoint,
            cache_len,
            refill_threshold,
            prefetch_batches,
            blocking_timeout,
            http_timeout,
            ..defaults
        }
    }

    pub fn buffer_config(&self) -> BufferConfig {
        BufferConfig {
            cache_len: self.cache_len,
            refill_threshold: self.refill_threshold,
            lo: self.lo,
            hi: self.hi,
            blocking_timeout: self.blocking_timeout,
            backoff: self.backoff,
        }
    }

    /// Client settings, if an API key is configured.
    pub fn client_config(&self) -> Option<RandomOrgConfig> {
        self.api_key.as_ref().map(|key| RandomOrgConfig {
            api_key: key.clone(),
            endpoint: self.endpoint.clone(),
            http_timeout: self.http_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = RemoteConfig::from_lookup(|_| None);
        assert_eq!(config, RemoteConfig::default());
        assert!(config.client_config().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = RemoteConfig::from_lookup(lookup(&[
            ("TETROMINO_REMOTE_API_KEY", " abc "),
            ("TETROMINO_REMOTE_CACHE_LEN", "40"),
            ("TETROMINO_REMOTE_BLOCKING_TIMEOUT_SECS", "10"),
            ("TETROMINO_REMOTE_HTTP_TIMEOUT_SECS", "3"),
        ]));

        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.cache_len, 40);
        assert_eq!(config.refill_threshold, 40);
        assert_eq!(config.blocking_timeout, Duration::from_secs(10));

        let client = config.client_config().unwrap();
        assert_eq!(client.http_timeout, Duration::from_secs(3));
        assert_eq!(client.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = RemoteConfig::from_lookup(lookup(&[
            ("TETROMINO_REMOTE_CACHE_LEN", "lots"),
            ("TETROMINO_REMOTE_THRESHOLD", "-1"),
            ("TETROMINO_REMOTE_API_KEY", ""),
        ]));
        assert_eq!(config.cache_len, DEFAULT_CACHE_LEN);
        assert_eq!(config.refill_threshold, DEFAULT_CACHE_LEN);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_buffer_config_carries_threshold() {
        let config = RemoteConfig {
            cache_len: 10,
            refill_threshold: 4,
            ..RemoteConfig::default()
        };
        let buffer = config.buffer_config();
        assert_eq!(buffer.cache_len, 10);
        assert_eq!(buffer.refill_threshold, 4);
        assert!(buffer.validate().is_ok());
    }
}
