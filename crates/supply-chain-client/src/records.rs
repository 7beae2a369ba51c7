//! Contract Records
//!
//! Plain views of the data the SupplyChain contract stores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// 1-based id assigned by the contract
    pub id: u64,
    pub name: String,
    /// Price in the smallest currency unit
    pub price: u128,
    pub stock: u128,
}

/// One line of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: u64,
    pub quantity: u128,
}

/// Shipment record as stored on chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shipment {
    /// Zero when the record was never initialised
    pub order_id: u128,
    pub status_code: u128,
}

impl Shipment {
    pub fn exists(&self) -> bool {
        self.order_id != 0
    }

    pub fn status(&self) -> ShipmentStatus {
        ShipmentStatus::from_code(self.status_code)
    }
}

/// Shipment progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentStatus {
    InWarehouse,
    InTransit,
    Delivered,
    Unknown(u128),
}

impl ShipmentStatus {
    pub fn from_code(code: u128) -> Self {
        match code {
            0 => ShipmentStatus::InWarehouse,
            1 => ShipmentStatus::InTransit,
            2 => ShipmentStatus::Delivered,
            other => ShipmentStatus::Unknown(other),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShipmentStatus::InWarehouse => "In Warehouse",
            ShipmentStatus::InTransit => "In Transit",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Unknown(_) => "Unknown",
        }
    }
}

/// Result of looking up the shipment for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentLookup {
    Found(ShipmentStatus),
    NotFound,
}

impl fmt::Display for ShipmentLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShipmentLookup::Found(status) => f.write_str(status.label()),
            ShipmentLookup::NotFound => f.write_str("Order not found"),
        }
    }
}

impl From<Shipment> for ShipmentLookup {
    fn from(shipment: Shipment) -> Self {
        if shipment.exists() {
            ShipmentLookup::Found(shipment.status())
        } else {
            ShipmentLookup::NotFound
        }
    }
}
