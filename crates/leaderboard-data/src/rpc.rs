//! Minimal JSON-RPC 2.0 client over HTTP for `eth_blockNumber` and `eth_getLogs`.
//!
//! Transient transport failures are retried with exponential backoff. Errors
//! reported by the node itself are returned as-is and never retried.

use alloy::primitives::U64;
use eyre::{eyre, Context, Result};
use reqwest::{Certificate, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::types::{EthLogRecord, GetLogsFilter, JsonRpcRequest, JsonRpcResponse};

/// First retry waits this long; each further retry doubles it.
const RETRY_BASE_BACKOFF_MS: u64 = 500;

/// Timeouts, trust roots and retry budget for [`RpcClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    /// Budget for establishing the TCP connection.
    pub dial_timeout: Duration,
    /// Budget for the TLS handshake once connected.
    pub tls_handshake_timeout: Duration,
    /// Budget for a whole request, including reading the body.
    pub http_client_timeout: Duration,
    /// Optional PEM bundle with extra root certificates.
    pub ca_bundle: Option<PathBuf>,
    /// Additional attempts after the first failed one.
    pub max_retries: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            dial_timeout: Duration::from_secs(15),
            tls_handshake_timeout: Duration::from_secs(15),
            http_client_timeout: Duration::from_secs(15),
            ca_bundle: None,
            max_retries: 2,
        }
    }
}

/// JSON-RPC client bound to a single node endpoint.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    url: Url,
    next_id: AtomicU64,
    max_retries: u32,
}

impl RpcClient {
    /// Builds a client for `rpc_url`.
    ///
    /// reqwest's connect phase spans both the TCP dial and the TLS handshake,
    /// so its connect timeout is the sum of the two budgets.
    ///
    /// # Errors
    /// Returns error if the URL is not an http(s) URL, the CA bundle cannot be
    /// read or parsed, or the HTTP client cannot be built.
    pub fn new(rpc_url: &str, config: &TransportConfig) -> Result<Self> {
        let url = Url::parse(rpc_url).wrap_err("invalid RPC URL format")?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(eyre!(
                "unsupported RPC URL scheme {:?}, expected http or https",
                url.scheme()
            ));
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.dial_timeout + config.tls_handshake_timeout)
            .timeout(config.http_client_timeout);

        if let Some(path) = &config.ca_bundle {
            let pem = std::fs::read(path)
                .wrap_err_with(|| format!("failed to read CA bundle {}", path.display()))?;
            let certs = Certificate::from_pem_bundle(&pem)
                .wrap_err_with(|| format!("failed to parse CA bundle {}", path.display()))?;
            tracing::debug!(path = %path.display(), count = certs.len(), "loaded extra root certificates");
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        let http = builder.build().wrap_err("failed to build HTTP client")?;

        Ok(Self {
            http,
            url,
            next_id: AtomicU64::new(1),
            max_retries: config.max_retries,
        })
    }

    /// Returns the number of the most recent block.
    ///
    /// # Errors
    /// Returns error if the call fails or the result is not a hex quantity.
    #[tracing::instrument(skip(self))]
    pub async fn block_number(&self) -> Result<u64> {
        let raw: String = self.call("eth_blockNumber", Vec::new()).await?;
        let number: U64 = raw
            .parse()
            .wrap_err_with(|| format!("invalid block number quantity {raw:?}"))?;
        Ok(number.to::<u64>())
    }

    /// Returns every log from `from_block` to latest whose topic0 is `topic0`.
    ///
    /// # Errors
    /// Returns error if the call fails or the result is not a log array.
    #[tracing::instrument(skip(self, topic0))]
    pub async fn get_logs(&self, from_block: u64, topic0: &str) -> Result<Vec<EthLogRecord>> {
        let filter = GetLogsFilter::from_block_with_topic0(from_block, topic0);
        let params = vec![serde_json::to_value(&filter).wrap_err("failed to encode log filter")?];
        let logs: Vec<EthLogRecord> = self.call("eth_getLogs", params).await?;
        tracing::debug!(count = logs.len(), "received log records");
        Ok(logs)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let request = JsonRpcRequest::new(self.next_request_id(), method, params);
        let response = self.send_with_retry(&request).await?;

        let envelope: JsonRpcResponse<T> = response
            .json()
            .await
            .wrap_err_with(|| format!("failed to decode {method} response"))?;

        envelope
            .into_result()
            .wrap_err_with(|| format!("{method} rejected by node"))
    }

    async fn send_with_retry(&self, request: &JsonRpcRequest) -> Result<reqwest::Response> {
        let mut attempt = 0u32;
        loop {
            let err = match self.http.post(self.url.clone()).json(request).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if is_transient_status(response.status()) => {
                    eyre!("node returned HTTP {}", response.status().as_u16())
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(eyre!(
                        "{} failed with HTTP {}: {}",
                        request.method,
                        status.as_u16(),
                        body
                    ));
                }
                Err(e) => eyre::Report::new(e),
            };

            if attempt >= self.max_retries {
                return Err(err.wrap_err(format!(
                    "{} failed after {} attempt(s)",
                    request.method,
                    attempt + 1
                )));
            }

            let backoff_ms = RETRY_BASE_BACKOFF_MS.saturating_mul(2_u64.saturating_pow(attempt));
            tracing::debug!(
                method = %request.method,
                attempt = attempt + 1,
                backoff_ms,
                error = %err,
                "retrying RPC call"
            );
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            attempt += 1;
        }
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// First block to scan when looking `depth` blocks back from `latest`.
///
/// A depth of 0 scans only from the latest block; a depth reaching past
/// genesis clamps to block 0.
pub fn from_block_for_depth(latest: u64, depth: u64) -> u64 {
    if depth == 0 {
        latest
    } else {
        latest.saturating_sub(depth)
    }
}
