//! Handler errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use supply_chain_client::ContractError;
use thiserror::Error;
use tracing::error;

use crate::forms::FormError;
use crate::views;

/// Errors that end a request with an error page
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("No page at {0}")]
    NotFound(String),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Form(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Contract(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Contract(err) => {
                error!("Contract call failed: {}", err);
                "The request could not be completed.".to_string()
            }
            other => other.to_string(),
        };
        (status, views::error_page(status, &message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::from(FormError::Missing("name")).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("/x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(ContractError::NoAccounts).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_contract_details_are_not_shown() {
        let response = AppError::from(ContractError::Transport("connection refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("could not be completed"));
        assert!(!body.contains("connection refused"));
    }
}
