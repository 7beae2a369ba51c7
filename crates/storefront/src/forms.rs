//! Form parsing
//!
//! Fields arrive URL-encoded and may repeat (`product_id`, `quantity` on the
//! order form), so bodies are read as ordered key/value pairs.

use supply_chain_client::OrderLine;
use thiserror::Error;

/// Problems with a submitted form
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Malformed form body: {0}")]
    Malformed(String),
    #[error("Missing field `{0}`")]
    Missing(&'static str),
    #[error("Field `{field}` must be a non-negative integer, got {value:?}")]
    NotAnInteger { field: &'static str, value: String },
}

/// Ordered URL-encoded form fields
#[derive(Debug, Default)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn parse(body: &[u8]) -> Result<Self, FormError> {
        serde_urlencoded::from_bytes(body)
            .map(FormFields)
            .map_err(|e| FormError::Malformed(e.to_string()))
    }

    pub fn first<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        self.all(name).next()
    }

    /// Every value submitted under `name`, in order
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn required(&self, name: &'static str) -> Result<&str, FormError> {
        self.first(name).ok_or(FormError::Missing(name))
    }
}

/// Integer coercion: surrounding whitespace is ignored, signs other than `+` are not
pub fn parse_uint<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, FormError> {
    raw.trim().parse().map_err(|_| FormError::NotAnInteger {
        field,
        value: raw.to_string(),
    })
}

/// Fields of the add-product form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: u128,
    pub stock: u128,
}

impl TryFrom<&FormFields> for NewProduct {
    type Error = FormError;

    fn try_from(form: &FormFields) -> Result<Self, Self::Error> {
        Ok(Self {
            name: form.required("name")?.to_string(),
            price: parse_uint("price", form.required("price")?)?,
            stock: parse_uint("stock", form.required("stock")?)?,
        })
    }
}

/// Pair `product_id` and `quantity` fields positionally.
///
/// Extra values on either side are ignored. Every pair is passed on as
/// submitted; whether a line is acceptable is up to the contract.
pub fn order_lines(form: &FormFields) -> Result<Vec<OrderLine>, FormError> {
    form.all("product_id")
        .zip(form.all("quantity"))
        .map(|(id, quantity)| {
            Ok(OrderLine {
                product_id: parse_uint("product_id", id)?,
                quantity: parse_uint("quantity", quantity)?,
            })
        })
        .collect()
}
