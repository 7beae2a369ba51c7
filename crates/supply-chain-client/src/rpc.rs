//! Ethereum JSON-RPC Client
//!
//! Thin async wrapper over the handful of node methods the binding needs.
//! The wire transport is a trait so tests can script node responses.

use crate::abi::{from_hex, from_quantity, to_hex, to_quantity, Address};
use crate::error::ContractError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Sends one JSON-RPC request and returns its `result`
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ContractError>;
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC over HTTP POST
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ContractError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("RPC #{} {} -> {}", id, method, self.url);
        metrics::counter!("supply_chain_rpc_requests_total", "method" => method.to_string()).increment(1);

        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            metrics::counter!("supply_chain_rpc_errors_total", "method" => method.to_string()).increment(1);
            return Err(ContractError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

/// Transaction to submit through `eth_sendTransaction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
    pub value: Option<u128>,
}

impl TransactionRequest {
    fn to_json(&self) -> Value {
        let mut tx = json!({
            "from": self.from.to_string(),
            "to": self.to.to_string(),
            "data": to_hex(&self.data),
        });
        if let Some(value) = self.value {
            tx["value"] = Value::String(to_quantity(value));
        }
        tx
    }
}

/// Mined transaction receipt (fields the storefront uses)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: String,
    pub block_number: Option<u128>,
    pub success: bool,
}

impl Receipt {
    fn from_json(value: &Value) -> Result<Self, ContractError> {
        let field = |name: &str| value.get(name).and_then(Value::as_str);

        let transaction_hash = field("transactionHash")
            .ok_or_else(|| ContractError::InvalidResponse("receipt has no transactionHash".to_string()))?
            .to_string();
        let block_number = field("blockNumber").map(from_quantity).transpose()?;
        // pre-Byzantium receipts carry no status; treat them as successful
        let success = match field("status") {
            Some(status) => from_quantity(status)? == 1,
            None => true,
        };

        Ok(Self {
            transaction_hash,
            block_number,
            success,
        })
    }
}

/// How long to wait for a transaction to be mined
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Typed node methods over a [`Transport`]
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn Transport>,
}

impl RpcClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Client talking HTTP to `url`
    pub fn http(url: &str) -> Self {
        Self::new(Arc::new(HttpTransport::new(url)))
    }

    /// Unlocked accounts managed by the node
    pub async fn accounts(&self) -> Result<Vec<Address>, ContractError> {
        let result = self.transport.request("eth_accounts", json!([])).await?;
        let accounts: Vec<String> = serde_json::from_value(result)?;
        accounts.iter().map(|a| a.parse()).collect()
    }

    /// First node account, used as the sender of every transaction
    pub async fn default_account(&self) -> Result<Address, ContractError> {
        self.accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(ContractError::NoAccounts)
    }

    /// Read-only call against the latest block
    pub async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, ContractError> {
        let params = json!([{ "to": to.to_string(), "data": to_hex(data) }, "latest"]);
        let result = self.transport.request("eth_call", params).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| ContractError::InvalidResponse(format!("eth_call returned {}", result)))?;
        from_hex(hex)
    }

    /// Submit a transaction and return its hash
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, ContractError> {
        let result = self
            .transport
            .request("eth_sendTransaction", json!([tx.to_json()]))
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ContractError::InvalidResponse(format!("eth_sendTransaction returned {}", result)))
    }

    /// Receipt for `hash`, or `None` while the transaction is pending
    pub async fn transaction_receipt(&self, hash: &str) -> Result<Option<Receipt>, ContractError> {
        let result = self
            .transport
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        Receipt::from_json(&result).map(Some)
    }

    /// Poll until `hash` is mined or the policy timeout elapses
    pub async fn wait_for_receipt(&self, hash: &str, policy: ReceiptPolicy) -> Result<Receipt, ContractError> {
        let poll = async {
            loop {
                if let Some(receipt) = self.transaction_receipt(hash).await? {
                    return Ok::<_, ContractError>(receipt);
                }
                tokio::time::sleep(policy.poll_interval).await;
            }
        };

        match tokio::time::timeout(policy.timeout, poll).await {
            Ok(receipt) => receipt,
            Err(_) => {
                warn!("Transaction {} not mined within {:?}", hash, policy.timeout);
                Err(ContractError::ReceiptTimeout {
                    hash: hash.to_string(),
                    secs: policy.timeout.as_secs(),
                })
            }
        }
    }
}
