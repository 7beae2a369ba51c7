//! HTML views
//!
//! Every page shares [`layout`]; all text coming from the chain or the user
//! goes through [`escape`].

use axum::http::StatusCode;
use axum::response::Html;
use supply_chain_client::Product;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title} | Supply Chain</title>
</head>
<body>
  <nav>
    <a href="/">Home</a> |
    <a href="/add_product">Add Product</a> |
    <a href="/list_products">Products</a> |
    <a href="/place_order">Place Order</a>
  </nav>
  <h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body
    ))
}

pub fn home() -> Html<String> {
    layout(
        "Supply Chain",
        r#"  <p>Manage the product catalog, place orders and track shipments on the SupplyChain contract.</p>
  <ul>
    <li><a href="/add_product">Add a product</a></li>
    <li><a href="/list_products">List products</a></li>
    <li><a href="/place_order">Place an order</a></li>
  </ul>
  <form method="get" onsubmit="window.location='/order_status/'+this.order_id.value; return false;">
    <label>Order id <input type="number" name="order_id" min="1" required></label>
    <button type="submit">Check status</button>
  </form>"#,
    )
}

pub fn add_product_form() -> Html<String> {
    layout(
        "Add Product",
        r#"  <form method="post" action="/add_product">
    <label>Name <input type="text" name="name" required></label>
    <label>Price <input type="number" name="price" min="0" required></label>
    <label>Stock <input type="number" name="stock" min="0" required></label>
    <button type="submit">Add Product</button>
  </form>"#,
    )
}

fn product_row(product: &Product) -> String {
    format!(
        "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        product.id,
        escape(&product.name),
        product.price,
        product.stock
    )
}

pub fn product_list(products: &[Product]) -> Html<String> {
    if products.is_empty() {
        return layout("Products", "  <p>No products yet.</p>");
    }

    let rows: String = products.iter().map(product_row).collect();
    layout(
        "Products",
        &format!(
            "  <table>\n    <tr><th>ID</th><th>Name</th><th>Price</th><th>Stock</th></tr>\n{}  </table>",
            rows
        ),
    )
}

pub fn order_form(products: &[Product]) -> Html<String> {
    if products.is_empty() {
        return layout(
            "Place Order",
            r#"  <p>No products available. <a href="/add_product">Add one first.</a></p>"#,
        );
    }

    let rows: String = products
        .iter()
        .map(|p| {
            format!(
                "    <tr><td>{name}</td><td>{price}</td><td>{stock}</td>\
                 <td><input type=\"hidden\" name=\"product_id\" value=\"{id}\">\
                 <input type=\"number\" name=\"quantity\" min=\"0\" value=\"0\"></td></tr>\n",
                id = p.id,
                name = escape(&p.name),
                price = p.price,
                stock = p.stock
            )
        })
        .collect();

    layout(
        "Place Order",
        &format!(
            "  <form method=\"post\" action=\"/place_order\">\n  <table>\n    \
             <tr><th>Product</th><th>Price</th><th>Stock</th><th>Quantity</th></tr>\n{}  </table>\n  \
             <button type=\"submit\">Place Order</button>\n  </form>",
            rows
        ),
    )
}

pub fn order_status(order_id: u64, status: &str) -> Html<String> {
    layout(
        "Order Status",
        &format!(
            "  <p>Order <strong>#{}</strong></p>\n  <p class=\"status\">{}</p>",
            order_id,
            escape(status)
        ),
    )
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(title, &format!("  <p>{}</p>", escape(message)))
}
