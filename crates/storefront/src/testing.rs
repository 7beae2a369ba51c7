//! In-memory contract and request helpers for router tests

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use supply_chain_client::{ContractError, OrderLine, Product, Receipt, Shipment, SupplyChain};
use tower::ServiceExt;

use crate::{create_router, AppState};

/// Contract stand-in keeping its state in memory
#[derive(Default)]
pub struct FakeChain {
    pub products: Mutex<Vec<Product>>,
    pub orders: Mutex<Vec<(Vec<OrderLine>, u128)>>,
    pub shipments: Mutex<HashMap<u64, Shipment>>,
    /// Fail every call as if the node were down
    pub offline: bool,
}

impl FakeChain {
    pub fn with_products(products: &[(&str, u128, u128)]) -> Self {
        let chain = Self::default();
        {
            let mut stored = chain.products.lock().unwrap();
            for (i, (name, price, stock)) in products.iter().enumerate() {
                stored.push(Product {
                    id: i as u64 + 1,
                    name: name.to_string(),
                    price: *price,
                    stock: *stock,
                });
            }
        }
        chain
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }

    pub fn ship(&self, order_id: u64, status_code: u128) {
        self.shipments.lock().unwrap().insert(
            order_id,
            Shipment {
                order_id: order_id.into(),
                status_code,
            },
        );
    }

    fn online(&self) -> Result<(), ContractError> {
        if self.offline {
            return Err(ContractError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn receipt() -> Receipt {
        Receipt {
            transaction_hash: "0x01".to_string(),
            block_number: Some(1),
            success: true,
        }
    }
}

#[async_trait]
impl SupplyChain for FakeChain {
    async fn add_product(&self, name: &str, price: u128, stock: u128) -> Result<Receipt, ContractError> {
        self.online()?;
        let mut products = self.products.lock().unwrap();
        let id = products.len() as u64 + 1;
        products.push(Product {
            id,
            name: name.to_string(),
            price,
            stock,
        });
        Ok(Self::receipt())
    }

    async fn product_count(&self) -> Result<u64, ContractError> {
        self.online()?;
        Ok(self.products.lock().unwrap().len() as u64)
    }

    async fn list_product(&self, id: u64) -> Result<Product, ContractError> {
        self.online()?;
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ContractError::Rpc {
                code: 3,
                message: "execution reverted: Invalid product ID".to_string(),
            })
    }

    async fn product_price(&self, id: u64) -> Result<u128, ContractError> {
        Ok(self.list_product(id).await?.price)
    }

    async fn place_order(&self, lines: &[OrderLine], value: u128) -> Result<Receipt, ContractError> {
        self.online()?;
        let order_id = {
            let mut orders = self.orders.lock().unwrap();
            orders.push((lines.to_vec(), value));
            orders.len() as u64
        };
        self.ship(order_id, 0);
        Ok(Self::receipt())
    }

    async fn order_count(&self) -> Result<u64, ContractError> {
        self.online()?;
        Ok(self.orders.lock().unwrap().len() as u64)
    }

    async fn shipment(&self, order_id: u64) -> Result<Shipment, ContractError> {
        self.online()?;
        Ok(self
            .shipments
            .lock()
            .unwrap()
            .get(&order_id)
            .copied()
            .unwrap_or(Shipment {
                order_id: 0,
                status_code: 0,
            }))
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Run one request through a fresh router backed by `chain`
pub async fn send(chain: Arc<FakeChain>, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let state = Arc::new(AppState::new(chain, "http://fake:8545", "0xfake"));
    let response = create_router(state).oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}
