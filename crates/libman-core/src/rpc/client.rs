//! Backend JSON-RPC client.
//!
//! `RpcClient` is the seam handlers call through; `HttpRpcClient` is the
//! production transport, posting JSON-RPC 2.0 envelopes to the backend's
//! HTTP endpoint.

use super::protocol::{RpcRequest, RpcResponse};
use crate::config::NetworkConfig;
use crate::{LibmanError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use url::Url;

/// Invoke a named remote procedure with positional arguments.
#[async_trait]
pub trait RpcClient: Send + Sync {
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value>;
}

/// JSON-RPC 2.0 over HTTP POST.
#[derive(Debug)]
pub struct HttpRpcClient {
    endpoint: Url,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    /// Create a client targeting the backend's JSON-RPC endpoint.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| LibmanError::Config {
            message: format!("Invalid backend URL '{}': {}", endpoint, e),
        })?;

        let client = reqwest::Client::builder()
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .timeout(NetworkConfig::REQUEST_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()?;

        Ok(Self {
            endpoint,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(method, params, id);
        debug!("RPC -> {} #{}", method, id);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LibmanError::Transport {
                message: format!("Backend returned {}: {}", status, body),
                source: None,
            });
        }

        let body = response.bytes().await?;
        let envelope: RpcResponse =
            serde_json::from_slice(&body).map_err(|e| LibmanError::Json {
                message: format!("Failed to parse RPC response: {}", e),
                source: Some(e),
            })?;

        envelope.into_result()
    }
}
