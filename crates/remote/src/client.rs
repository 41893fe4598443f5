//! random.org JSON-RPC client
//!
//! Bridges the synchronous feed with async HTTP. The client owns a tokio runtime;
//! an [`IntegerCache`] runs a background task on it that keeps a few batches
//! ready in a bounded channel, so `fetch` never waits on the network.
//!
//! The blocking calls (`bits_left`, `IntegerCache::quota`) use `block_on` and must
//! not be made from inside another tokio runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use tetromino_feed_core::SourceError;

use crate::protocol::{
    GenerateIntegersParams, GenerateIntegersResult, RpcRequest, RpcResponse, UsageParams,
    UsageResult, METHOD_GENERATE_INTEGERS, METHOD_GET_USAGE,
};
use crate::service::IntegerCacheService;

/// Public JSON-RPC endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.random.org/json-rpc/4/invoke";

/// Pause before retrying after a failed background request.
const ERROR_RETRY_DELAY: Duration = Duration::from_secs(1);

type BatchResult = Result<Vec<i64>, SourceError>;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomOrgConfig {
    pub api_key: String,
    pub endpoint: String,
    /// Upper bound on a single HTTP request.
    pub http_timeout: Duration,
}

impl RandomOrgConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            http_timeout: Duration::from_secs(tetromino_feed_types::DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// JSON-RPC caller shared between the client and its background tasks.
#[derive(Clone)]
struct Rpc {
    http: reqwest::Client,
    endpoint: String,
    api_key: Arc<str>,
    http_timeout: Duration,
    next_id: Arc<AtomicU64>,
}

impl Rpc {
    async fn call<P, R>(&self, method: &'static str, params: P) -> Result<R, SourceError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(method, params, id);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport(format!(
                "{} returned HTTP {}",
                method, status
            )));
        }

        let body: RpcResponse<R> = response
            .json()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        if let Some(error) = body.error {
            return Err(SourceError::Remote {
                code: error.code,
                message: error.message,
            });
        }

        body.result
            .ok_or_else(|| SourceError::Protocol(format!("{} response has no result", method)))
    }

    fn transport_error(&self, method: &'static str, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout {
                operation: method,
                elapsed: self.http_timeout,
            }
        } else if e.is_decode() {
            SourceError::Protocol(format!("{}: {}", method, e))
        } else {
            SourceError::Transport(format!("{}: {}", method, e))
        }
    }

    async fn generate_integers(
        &self,
        n: usize,
        min: i64,
        max: i64,
    ) -> Result<GenerateIntegersResult, SourceError> {
        let params = GenerateIntegersParams {
            api_key: &self.api_key,
            n,
            min,
            max,
            replacement: true,
        };
        self.call(METHOD_GENERATE_INTEGERS, params).await
    }

    async fn bits_left(&self) -> Result<i64, SourceError> {
        let params = UsageParams {
            api_key: &self.api_key,
        };
        let usage: UsageResult = self.call(METHOD_GET_USAGE, params).await?;
        Ok(usage.bits_left)
    }
}

/// Synchronous random.org client.
pub struct RandomOrgClient {
    rt: Arc<Runtime>,
    rpc: Rpc,
}

impl RandomOrgClient {
    pub fn new(config: RandomOrgConfig) -> Result<Self, SourceError> {
        if config.api_key.trim().is_empty() {
            return Err(SourceError::InvalidConfig("missing api key".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| SourceError::Transport(format!("failed to build http client: {}", e)))?;

        let rt = Runtime::new()
            .map_err(|e| SourceError::Transport(format!("failed to create tokio runtime: {}", e)))?;

        Ok(Self {
            rt: Arc::new(rt),
            rpc: Rpc {
                http,
                endpoint: config.endpoint,
                api_key: config.api_key.into(),
                http_timeout: config.http_timeout,
                next_id: Arc::new(AtomicU64::new(1)),
            },
        })
    }

    /// Remaining bits on the API key (`getUsage`).
    pub fn bits_left(&self) -> Result<i64, SourceError> {
        self.rt.block_on(self.rpc.bits_left())
    }

    /// Start a background cache of `n`-integer batches over `[min, max]`.
    ///
    /// At most `prefetch` batches are held ready; the task pauses when the
    /// channel is full and resumes as batches are taken.
    pub fn create_integer_cache(&self, n: usize, min: i64, max: i64, prefetch: usize) -> IntegerCache {
        let (tx, rx) = mpsc::channel::<BatchResult>(prefetch.max(1));
        let rpc = self.rpc.clone();
        let task = self.rt.spawn(fill_cache(rpc, n, min, max, tx));

        IntegerCache {
            rt: Arc::clone(&self.rt),
            rpc: self.rpc.clone(),
            rx,
            task,
        }
    }
}

async fn fill_cache(rpc: Rpc, n: usize, min: i64, max: i64, tx: mpsc::Sender<BatchResult>) {
    loop {
        let (item, delay) = match rpc.generate_integers(n, min, max).await {
            Ok(result) => {
                debug!(
                    n = result.random.data.len(),
                    bits_left = ?result.bits_left,
                    advisory_delay_ms = result.advisory_delay,
                    "cached remote batch"
                );
                let delay = Duration::from_millis(result.advisory_delay);
                (Ok(result.random.data), delay)
            }
            Err(e) => {
                warn!(error = %e, "remote batch request failed");
                (Err(e), ERROR_RETRY_DELAY)
            }
        };

        if tx.send(item).await.is_err() {
            debug!("integer cache closed, stopping");
            return;
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Background-filled batch cache created by [`RandomOrgClient::create_integer_cache`].
pub struct IntegerCache {
    rt: Arc<Runtime>,
    rpc: Rpc,
    rx: mpsc::Receiver<BatchResult>,
    task: JoinHandle<()>,
}

impl IntegerCacheService for IntegerCache {
    fn fetch(&mut self) -> Result<Option<Vec<i64>>, SourceError> {
        match self.rx.try_recv() {
            Ok(Ok(batch)) => Ok(Some(batch)),
            Ok(Err(e)) => Err(e),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SourceError::Transport(
                "integer cache task stopped".to_string(),
            )),
        }
    }

    fn quota(&mut self) -> Result<i64, SourceError> {
        self.rt.block_on(self.rpc.bits_left())
    }
}

impl Drop for IntegerCache {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_server() -> (Runtime, MockServer) {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        (rt, server)
    }

    fn client_for(server: &MockServer, http_timeout: Duration) -> RandomOrgClient {
        RandomOrgClient::new(RandomOrgConfig {
            api_key: "test-key".to_string(),
            endpoint: server.uri(),
            http_timeout,
        })
        .unwrap()
    }

    fn mount(rt: &Runtime, server: &MockServer, rpc_method: &str, body: serde_json::Value) {
        rt.block_on(
            Mock::given(method("POST"))
                .and(body_partial_json(json!({ "method": rpc_method })))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(server),
        );
    }

    fn wait_for_batch(cache: &mut IntegerCache) -> Result<Vec<i64>, SourceError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(batch) = cache.fetch()? {
                return Ok(batch);
            }
            assert!(Instant::now() < deadline, "cache never became ready");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = RandomOrgClient::new(RandomOrgConfig::new("  ")).err().unwrap();
        assert!(matches!(err, SourceError::InvalidConfig(_)));
    }

    #[test]
    fn test_bits_left_reads_usage() {
        let (rt, server) = mock_server();
        mount(
            &rt,
            &server,
            "getUsage",
            json!({
                "jsonrpc": "2.0",
                "result": {"status": "running", "bitsLeft": 998532, "requestsLeft": 200064},
                "id": 1
            }),
        );

        let client = client_for(&server, Duration::from_secs(5));
        assert_eq!(client.bits_left(), Ok(998532));
    }

    #[test]
    fn test_provider_error_is_surfaced() {
        let (rt, server) = mock_server();
        mount(
            &rt,
            &server,
            "getUsage",
            json!({
                "jsonrpc": "2.0",
                "error": {"code": 401, "message": "The API key you specified is not running"},
                "id": 1
            }),
        );

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.bits_left().unwrap_err();
        assert!(matches!(err, SourceError::Remote { code: 401, .. }));
    }

    #[test]
    fn test_slow_response_times_out() {
        let (rt, server) = mock_server();
        rt.block_on(
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_delay(Duration::from_millis(500))
                        .set_body_json(json!({"jsonrpc": "2.0", "result": {"bitsLeft": 1}, "id": 1})),
                )
                .mount(&server),
        );

        let client = client_for(&server, Duration::from_millis(50));
        let err = client.bits_left().unwrap_err();
        assert!(matches!(err, SourceError::Timeout { .. }), "got {:?}", err);
    }

    #[test]
    fn test_integer_cache_delivers_batches() {
        let (rt, server) = mock_server();
        mount(
            &rt,
            &server,
            "generateIntegers",
            json!({
                "jsonrpc": "2.0",
                "result": {
                    "random": {"data": [4, 2, 7, 1], "completionTime": "2024-01-01 00:00:00Z"},
                    "bitsUsed": 11,
                    "bitsLeft": 249989,
                    "requestsLeft": 999,
                    "advisoryDelay": 0
                },
                "id": 1
            }),
        );

        let client = client_for(&server, Duration::from_secs(5));
        let mut cache = client.create_integer_cache(4, 1, 7, 2);

        assert_eq!(wait_for_batch(&mut cache), Ok(vec![4, 2, 7, 1]));
        assert_eq!(wait_for_batch(&mut cache), Ok(vec![4, 2, 7, 1]));
    }

    #[test]
    fn test_integer_cache_reports_failures() {
        let (rt, server) = mock_server();
        rt.block_on(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(503))
                .mount(&server),
        );

        let client = client_for(&server, Duration::from_secs(5));
        let mut cache = client.create_integer_cache(4, 1, 7, 1);

        let err = wait_for_batch(&mut cache).unwrap_err();
        assert!(matches!(err, SourceError::Transport(_)), "got {:?}", err);
    }
}
