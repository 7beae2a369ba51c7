//! Health and Metrics Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::SharedState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub rpc_url: String,
    pub contract_address: String,
}

/// Liveness of the storefront itself; does not touch the node
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        rpc_url: state.rpc_url.clone(),
        contract_address: state.contract_address.clone(),
    })
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<SharedState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{get, send, FakeChain};
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = send(Arc::new(FakeChain::offline()), get("/health")).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["rpc_url"], "http://fake:8545");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let (status, _, _) = send(Arc::new(FakeChain::default()), get("/metrics")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
