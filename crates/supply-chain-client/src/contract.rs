//! SupplyChain Contract Binding
//!
//! `SupplyChain` is the seam the web layer talks to. `SupplyChainContract`
//! implements it over JSON-RPC; the composite operations (listing, order
//! totals, order submission, shipment lookup) are provided on the trait so
//! every implementation shares them.

use crate::abi::{encode_call, Address, Decoder, Token};
use crate::error::ContractError;
use crate::interface::ContractInterface;
use crate::records::{OrderLine, Product, Shipment, ShipmentLookup};
use crate::rpc::{Receipt, ReceiptPolicy, RpcClient, TransactionRequest};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Contract function names the binding calls
pub mod functions {
    pub const ADD_PRODUCT: &str = "addProduct";
    pub const PRODUCT_COUNT: &str = "productCount";
    pub const LIST_PRODUCT: &str = "listProduct";
    pub const PRODUCTS: &str = "products";
    pub const PLACE_ORDER: &str = "placeOrder";
    pub const ORDER_COUNT: &str = "orderCount";
    pub const SHIPMENTS: &str = "shipments";

    pub const REQUIRED: [&str; 7] = [
        ADD_PRODUCT,
        PRODUCT_COUNT,
        LIST_PRODUCT,
        PRODUCTS,
        PLACE_ORDER,
        ORDER_COUNT,
        SHIPMENTS,
    ];
}

/// Word index of `price` in the `products(uint256)` getter result
const PRODUCTS_PRICE_WORD: usize = 2;
/// Word index of `status` in the `shipments(uint256)` getter result
const SHIPMENTS_STATUS_WORD: usize = 2;

/// Product, order and shipment operations offered by the contract
#[async_trait]
pub trait SupplyChain: Send + Sync {
    /// Add a catalog entry and wait for it to be mined
    async fn add_product(&self, name: &str, price: u128, stock: u128) -> Result<Receipt, ContractError>;

    /// Number of products; ids run from 1 to this value
    async fn product_count(&self) -> Result<u64, ContractError>;

    /// Read one product through `listProduct`
    async fn list_product(&self, id: u64) -> Result<Product, ContractError>;

    /// Unit price of a product as stored in the `products` mapping
    async fn product_price(&self, id: u64) -> Result<u128, ContractError>;

    /// Place an order paying `value` and wait for it to be mined
    async fn place_order(&self, lines: &[OrderLine], value: u128) -> Result<Receipt, ContractError>;

    /// Number of orders; the latest order has this id
    async fn order_count(&self) -> Result<u64, ContractError>;

    /// Raw shipment record for an order
    async fn shipment(&self, order_id: u64) -> Result<Shipment, ContractError>;

    /// Every product, in id order
    async fn list_products(&self) -> Result<Vec<Product>, ContractError> {
        let count = self.product_count().await?;
        let mut products = Vec::new();
        for id in 1..=count {
            products.push(self.list_product(id).await?);
        }
        Ok(products)
    }

    /// Sum of `price * quantity` over the lines
    async fn order_total(&self, lines: &[OrderLine]) -> Result<u128, ContractError> {
        let mut total: u128 = 0;
        for line in lines {
            let price = self.product_price(line.product_id).await?;
            total = price
                .checked_mul(line.quantity)
                .and_then(|cost| total.checked_add(cost))
                .ok_or(ContractError::Overflow("order total"))?;
        }
        Ok(total)
    }

    /// Pay for and place an order, returning the new order id
    async fn submit_order(&self, lines: &[OrderLine]) -> Result<u64, ContractError> {
        let total = self.order_total(lines).await?;
        debug!("Submitting order of {} lines, total {}", lines.len(), total);
        self.place_order(lines, total).await?;
        self.order_count().await
    }

    /// Shipment status for an order, or not found
    async fn shipment_status(&self, order_id: u64) -> Result<ShipmentLookup, ContractError> {
        let lookup = ShipmentLookup::from(self.shipment(order_id).await?);
        if lookup == ShipmentLookup::NotFound {
            warn!("No shipment recorded for order {}", order_id);
        }
        Ok(lookup)
    }
}

/// Where to find the contract
#[derive(Debug, Clone)]
pub struct ContractConfig {
    pub rpc_url: String,
    pub address: Address,
    pub abi_path: PathBuf,
    pub receipt: ReceiptPolicy,
}

/// JSON-RPC implementation of [`SupplyChain`]
pub struct SupplyChainContract {
    rpc: RpcClient,
    address: Address,
    interface: ContractInterface,
    receipt: ReceiptPolicy,
}

impl SupplyChainContract {
    /// Bind to a deployed contract, checking the interface declares every function used
    pub fn new(
        rpc: RpcClient,
        address: Address,
        interface: ContractInterface,
        receipt: ReceiptPolicy,
    ) -> Result<Self, ContractError> {
        interface.require(&functions::REQUIRED)?;
        Ok(Self {
            rpc,
            address,
            interface,
            receipt,
        })
    }

    /// Load the interface file and connect over HTTP
    pub fn connect(config: &ContractConfig) -> Result<Self, ContractError> {
        let interface = ContractInterface::from_path(&config.abi_path)?;
        info!(
            "Binding SupplyChain at {} via {} ({} functions)",
            config.address,
            config.rpc_url,
            interface.len()
        );
        Self::new(RpcClient::http(&config.rpc_url), config.address, interface, config.receipt)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    async fn call(&self, name: &str, args: &[Token]) -> Result<Vec<u8>, ContractError> {
        let function = self.interface.function(name)?;
        let data = encode_call(function.selector(), args);
        debug!("call {}", function.signature());
        self.rpc.call(&self.address, &data).await
    }

    async fn transact(&self, name: &str, args: &[Token], value: Option<u128>) -> Result<Receipt, ContractError> {
        let function = self.interface.function(name)?;
        let from = self.rpc.default_account().await?;
        let tx = TransactionRequest {
            from,
            to: self.address,
            data: encode_call(function.selector(), args),
            value,
        };

        let hash = self.rpc.send_transaction(&tx).await?;
        info!("Sent {} from {} as {}", function.signature(), from, hash);
        metrics::counter!("supply_chain_transactions_total", "function" => name.to_string()).increment(1);

        let receipt = self.rpc.wait_for_receipt(&hash, self.receipt).await?;
        if !receipt.success {
            warn!("{} reverted in transaction {}", function.signature(), hash);
            return Err(ContractError::Reverted(hash));
        }
        Ok(receipt)
    }

    async fn count(&self, name: &str) -> Result<u64, ContractError> {
        let data = self.call(name, &[]).await?;
        let count = Decoder::new(&data).uint(0)?;
        u64::try_from(count).map_err(|_| ContractError::Decode(format!("{} = {} out of range", name, count)))
    }
}

#[async_trait]
impl SupplyChain for SupplyChainContract {
    async fn add_product(&self, name: &str, price: u128, stock: u128) -> Result<Receipt, ContractError> {
        let args = [Token::String(name.to_string()), Token::Uint(price), Token::Uint(stock)];
        self.transact(functions::ADD_PRODUCT, &args, None).await
    }

    async fn product_count(&self) -> Result<u64, ContractError> {
        self.count(functions::PRODUCT_COUNT).await
    }

    async fn list_product(&self, id: u64) -> Result<Product, ContractError> {
        let data = self.call(functions::LIST_PRODUCT, &[Token::Uint(id.into())]).await?;
        let decoder = Decoder::new(&data);
        Ok(Product {
            id,
            name: decoder.string(0)?,
            price: decoder.uint(1)?,
            stock: decoder.uint(2)?,
        })
    }

    async fn product_price(&self, id: u64) -> Result<u128, ContractError> {
        let data = self.call(functions::PRODUCTS, &[Token::Uint(id.into())]).await?;
        Decoder::new(&data).uint(PRODUCTS_PRICE_WORD)
    }

    async fn place_order(&self, lines: &[OrderLine], value: u128) -> Result<Receipt, ContractError> {
        let ids = lines.iter().map(|l| u128::from(l.product_id)).collect();
        let quantities = lines.iter().map(|l| l.quantity).collect();
        let args = [Token::UintArray(ids), Token::UintArray(quantities)];
        self.transact(functions::PLACE_ORDER, &args, Some(value)).await
    }

    async fn order_count(&self) -> Result<u64, ContractError> {
        self.count(functions::ORDER_COUNT).await
    }

    async fn shipment(&self, order_id: u64) -> Result<Shipment, ContractError> {
        let data = self.call(functions::SHIPMENTS, &[Token::Uint(order_id.into())]).await?;
        let decoder = Decoder::new(&data);
        Ok(Shipment {
            order_id: decoder.uint(0)?,
            status_code: decoder.uint(SHIPMENTS_STATUS_WORD)?,
        })
    }
}
