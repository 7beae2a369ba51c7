//! Order Routes

use axum::{
    extract::{Path, RawForm, State},
    response::{Html, Redirect},
};
use tracing::{info, warn};

use crate::error::AppError;
use crate::forms::{self, FormFields};
use crate::{views, SharedState};

/// Order form listing every product
pub async fn order_form(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    let products = state.chain.list_products().await?;
    Ok(views::order_form(&products))
}

/// Pay for and place an order, then show its status
pub async fn place_order(
    State(state): State<SharedState>,
    RawForm(body): RawForm,
) -> Result<Redirect, AppError> {
    let form = FormFields::parse(&body)?;
    let lines = forms::order_lines(&form)?;

    let order_id = state.chain.submit_order(&lines).await?;
    metrics::counter!("storefront_orders_submitted_total").increment(1);
    info!("Placed order {} with {} lines", order_id, lines.len());

    Ok(Redirect::to(&format!("/order_status/{}", order_id)))
}

/// Digits only: no sign, no whitespace
fn parse_order_id(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Shipment status for an order; contract failures are shown on the page
pub async fn order_status(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let order_id = parse_order_id(&raw_id)
        .ok_or_else(|| AppError::NotFound(format!("/order_status/{}", raw_id)))?;

    let status = match state.chain.shipment_status(order_id).await {
        Ok(lookup) => lookup.to_string(),
        Err(e) => {
            warn!("Shipment lookup for order {} failed: {}", order_id, e);
            format!("Error: {}", e)
        }
    };

    Ok(views::order_status(order_id, &status))
}
