//! Home Route

use axum::response::Html;

use crate::views;

pub async fn home() -> Html<String> {
    views::home()
}

#[cfg(test)]
mod tests {
    use crate::testing::{get, send, FakeChain};
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_home_links_every_page() {
        let (status, _, body) = send(Arc::new(FakeChain::default()), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        for link in ["/add_product", "/list_products", "/place_order"] {
            assert!(body.contains(link), "missing link to {}", link);
        }
    }
}
