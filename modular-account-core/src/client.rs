use std::time::Duration;

use alloy_core::sol_types::{SolCall, SolError};
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;

use crate::entry_point::EntryPointDef;
use crate::error::AccountError;
use crate::factory::IEntryPoint;
use crate::init_code::InitCode;

/// The execution-layer seam for counterfactual address resolution.
///
/// The only I/O this crate performs goes through here, and it is performed
/// at most once per account construction. Implementations must not retry
/// internally: a transient failure has to surface to the caller, where a
/// wrong-network misconfiguration is distinguishable from a blip.
#[async_trait]
pub trait ExecutionLayer: Send + Sync {
    /// Resolves the address an account with `init_code` will occupy, by
    /// asking the entry point.
    ///
    /// # Errors
    /// Returns the underlying transport or decoding error unchanged.
    async fn resolve_counterfactual_address(
        &self,
        entry_point: &EntryPointDef,
        init_code: &InitCode,
    ) -> Result<Address, AccountError>;
}

/// JSON-RPC implementation of [`ExecutionLayer`].
///
/// Simulates the entry point's `getSenderAddress(initCode)` via `eth_call`;
/// that call always reverts with `SenderAddressResult(address)`, which is
/// decoded out of the error's revert data. One attempt per call, no
/// backoff.
#[derive(Debug, Clone)]
pub struct RpcExecutionLayer {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl RpcExecutionLayer {
    /// Creates a client against a node RPC endpoint.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Overrides the per-request timeout (default 5s).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn eth_call(&self, to: Address, data: &[u8]) -> Result<JsonRpcResponse, AccountError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": to, "data": format!("0x{}", hex::encode(data)) },
                "latest",
            ],
        });

        tracing::debug!(url = %self.url, to = %to, "eth_call");

        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .header(
                "User-Agent",
                concat!("modular-account-core/", env!("CARGO_PKG_VERSION")),
            )
            .json(&body)
            .send()
            .await
            .map_err(|err| AccountError::Network {
                url: self.url.clone(),
                status: err.status().map(|status| status.as_u16()),
                error: err.to_string(),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AccountError::Network {
                url: self.url.clone(),
                status: Some(status.as_u16()),
                error: format!("failed to read response body: {err}"),
            })?;

        serde_json::from_str(&text).map_err(|err| AccountError::Serialization {
            // Only the first characters of the body, enough to diagnose a
            // proxy or HTML error page without dumping it whole.
            error: format!(
                "failed to parse eth_call response from {} with status {status}: {err}, received: {}",
                self.url,
                text.chars().take(40).collect::<String>()
            ),
        })
    }
}

#[async_trait]
impl ExecutionLayer for RpcExecutionLayer {
    async fn resolve_counterfactual_address(
        &self,
        entry_point: &EntryPointDef,
        init_code: &InitCode,
    ) -> Result<Address, AccountError> {
        let probe = IEntryPoint::getSenderAddressCall {
            initCode: init_code.compute(),
        }
        .abi_encode();

        let response = self.eth_call(entry_point.address, &probe).await?;

        let Some(error) = response.error else {
            // A successful eth_call means we are not talking to a v0.7
            // entry point; getSenderAddress must revert.
            return Err(AccountError::CounterfactualResolution {
                reason: format!(
                    "getSenderAddress returned {} instead of reverting",
                    response.result.unwrap_or_default()
                ),
            });
        };

        let Some(data) = revert_bytes(error.data.as_ref()) else {
            return Err(AccountError::Rpc {
                code: error.code,
                message: error.message,
            });
        };

        IEntryPoint::SenderAddressResult::abi_decode(&data)
            .map(|revert| revert.sender)
            .map_err(|err| AccountError::CounterfactualResolution {
                reason: format!("revert data did not decode as SenderAddressResult: {err}"),
            })
    }
}

/// Pulls revert bytes out of a JSON-RPC error's `data` field, which nodes
/// deliver either as a hex string or nested one level down.
fn revert_bytes(data: Option<&serde_json::Value>) -> Option<Vec<u8>> {
    let data = match data? {
        serde_json::Value::String(hex_data) => hex_data,
        serde_json::Value::Object(fields) => fields.get("data")?.as_str()?,
        _ => return None,
    };
    hex::decode(data.strip_prefix("0x")?).ok()
}
