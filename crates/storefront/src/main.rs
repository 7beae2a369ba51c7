//! Supply Chain Storefront - Main Entry Point

use storefront::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_logging(&settings.logging)?;

    info!("=== Supply Chain Storefront v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Contract {} via {}", settings.chain.contract_address, settings.chain.rpc_url);

    run_server(&settings).await
}
