//! Supply Chain Storefront
//!
//! Web front-end for the SupplyChain contract: add products, place orders
//! and check shipment status. Every page is rendered from live contract
//! reads; nothing is stored locally.

use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use supply_chain_client::{SupplyChain, SupplyChainContract};
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod forms;
pub mod rate_limit;
mod routes;
pub mod views;

#[cfg(test)]
mod testing;

pub use crate::config::{Settings, SettingsError};
pub use error::AppError;

/// Application state shared across handlers (read-only after startup)
pub struct AppState {
    /// Contract binding
    pub chain: Arc<dyn SupplyChain>,
    /// Node endpoint, for display
    pub rpc_url: String,
    /// Contract address, for display
    pub contract_address: String,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Prometheus exporter, when installed
    pub metrics: Option<PrometheusHandle>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create new application state
    pub fn new(chain: Arc<dyn SupplyChain>, rpc_url: &str, contract_address: &str) -> Self {
        Self {
            chain,
            rpc_url: rpc_url.to_string(),
            contract_address: contract_address.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(routes::home::home))
        .route(
            "/add_product",
            get(routes::products::add_product_form).post(routes::products::add_product),
        )
        .route("/list_products", get(routes::products::list_products))
        .route(
            "/place_order",
            get(routes::orders::order_form).post(routes::orders::place_order),
        )
        .route("/order_status/:order_id", get(routes::orders::order_status))
        .route("/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging
pub fn init_logging(settings: &config::LoggingSettings) -> Result<(), SettingsError> {
    let level = Level::from_str(&settings.level)
        .map_err(|_| SettingsError::InvalidLevel(settings.level.clone()))?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.map_err(|e| SettingsError::Logging(e.to_string()))
}

/// Build the state from settings: bind the contract and install the exporter
pub fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let contract = SupplyChainContract::connect(&settings.chain.contract_config()?)?;
    let mut state = AppState::new(
        Arc::new(contract),
        &settings.chain.rpc_url,
        &settings.chain.contract_address,
    );

    if settings.metrics.enabled {
        state = state.with_metrics(PrometheusBuilder::new().install_recorder()?);
        info!("Prometheus recorder installed");
    }
    Ok(state)
}

/// Run the server until it stops
pub async fn run_server(settings: &Settings) -> anyhow::Result<()> {
    let state = Arc::new(build_state(settings)?);
    let mut app = create_router(state);

    if settings.rate_limit.enabled {
        match rate_limit::create_governor_config(&settings.rate_limit) {
            Some(config) => {
                info!(
                    "Rate limiting: burst {}, one request per {}s",
                    settings.rate_limit.burst_size, settings.rate_limit.replenish_interval_secs
                );
                app = app.layer(GovernorLayer { config });
            }
            None => warn!("Rate limiting disabled: invalid settings {:?}", settings.rate_limit),
        }
    }

    info!("Starting storefront on {}", settings.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
