//! SupplyChain Contract Client
//!
//! This crate binds the SupplyChain contract deployed on a local development
//! chain. It loads the contract interface file, encodes calls with the
//! contract ABI and talks to the node over JSON-RPC.

mod abi;
mod contract;
mod error;
mod interface;
mod records;
mod rpc;

pub use abi::{selector, Address, Token};
pub use contract::{functions, ContractConfig, SupplyChain, SupplyChainContract};
pub use error::ContractError;
pub use interface::{AbiFunction, AbiParam, ContractInterface};
pub use records::{OrderLine, Product, Shipment, ShipmentLookup, ShipmentStatus};
pub use rpc::{HttpTransport, Receipt, ReceiptPolicy, RpcClient, TransactionRequest, Transport};

/// Development chain defaults
pub mod defaults {
    /// Local Hardhat node
    pub const RPC_URL: &str = "http://127.0.0.1:8545/";
    /// First contract deployed by the default Hardhat account
    pub const CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    /// Interface file, relative to the working directory
    pub const ABI_PATH: &str = "SupplyChain.json";
}
