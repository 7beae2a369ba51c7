//! Contract Client Error Types

use thiserror::Error;

/// Errors that can occur while talking to the SupplyChain contract
#[derive(Debug, Error)]
pub enum ContractError {
    /// HTTP transport failure (connection refused, bad status, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON-RPC error object returned by the node
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Node answered with something that is not a valid JSON-RPC result
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Return data could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Arguments could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Interface description could not be loaded
    #[error("Invalid contract interface: {0}")]
    Interface(String),

    /// Interface description does not declare a function the binding needs
    #[error("Contract interface has no function named {0}")]
    MissingFunction(String),

    /// Node exposes no unlocked accounts to send from
    #[error("Node returned no accounts")]
    NoAccounts,

    /// Transaction was not mined in time
    #[error("Transaction {hash} not mined after {secs}s")]
    ReceiptTimeout { hash: String, secs: u64 },

    /// Transaction was mined but reverted
    #[error("Transaction {0} reverted")]
    Reverted(String),

    /// Integer arithmetic overflowed
    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),

    /// Filesystem error reading the interface file
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ContractError {
    fn from(err: std::io::Error) -> Self {
        ContractError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for ContractError {
    fn from(err: reqwest::Error) -> Self {
        ContractError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        ContractError::InvalidResponse(err.to_string())
    }
}

impl From<hex::FromHexError> for ContractError {
    fn from(err: hex::FromHexError) -> Self {
        ContractError::Decode(format!("bad hex: {}", err))
    }
}
