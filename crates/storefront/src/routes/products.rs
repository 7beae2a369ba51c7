//! Product Routes

use axum::{
    extract::{RawForm, State},
    response::{Html, Redirect},
};
use tracing::info;

use crate::error::AppError;
use crate::forms::{FormFields, NewProduct};
use crate::{views, SharedState};

pub async fn add_product_form() -> Html<String> {
    views::add_product_form()
}

/// Add a product and wait for the transaction to be mined
pub async fn add_product(
    State(state): State<SharedState>,
    RawForm(body): RawForm,
) -> Result<Redirect, AppError> {
    let form = FormFields::parse(&body)?;
    let product = NewProduct::try_from(&form)?;

    let receipt = state
        .chain
        .add_product(&product.name, product.price, product.stock)
        .await?;
    info!(
        "Added product {:?} (price {}, stock {}) in {}",
        product.name, product.price, product.stock, receipt.transaction_hash
    );

    Ok(Redirect::to("/list_products"))
}

pub async fn list_products(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    let products = state.chain.list_products().await?;
    Ok(views::product_list(&products))
}
