//! Shopify storefront types for the public `products.json` and
//! `products/<handle>.json` endpoints.
//!
//! ## Observed shape differences between stores
//!
//! ### Tags
//! The storefront JSON returns tags as an array of strings, but older themes
//! and exports re-serialized from Liquid carry a single comma-separated
//! string. [`StringOrList`] accepts both.
//!
//! ### `product_type`
//! Usually a plain string, sometimes empty, occasionally a hierarchy joined
//! with `:`, `/` or `,` (`"Shirts:Men,Casual"`). A few exports carry a list.
//!
//! ### Prices
//! Decimal strings (`"20.00"`) in the storefront feed, bare JSON numbers in
//! some exports. `compare_at_price` is `null` when the variant is not on
//! sale. Both shapes are read into `String`.
//!
//! ### `published_at`
//! Present (an ISO timestamp) only for products visible on the storefront.
//!
//! ### `available` / `taxable`
//! Booleans that older stores omit; both default to `true`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ScraperError;

/// Either a single delimited string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StringOrList {
    Text(String),
    List(Vec<String>),
}

impl Default for StringOrList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// A single product from the Shopify storefront.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopifyProduct {
    /// Shopify numeric product ID (e.g., `6789012345678`).
    pub id: i64,

    /// Display name of the product.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    /// URL slug for the product page. Absent on some hand-built exports.
    #[serde(default)]
    pub handle: Option<String>,

    /// Raw HTML product description.
    #[serde(default)]
    pub body_html: Option<String>,

    /// Vendor / brand name as configured in Shopify.
    #[serde(default)]
    pub vendor: Option<String>,

    #[serde(default)]
    pub product_type: Option<StringOrList>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: StringOrList,

    /// Publication timestamp; absent or empty for unpublished products.
    #[serde(default)]
    pub published_at: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<ShopifyImage>,

    /// Variation axes, at most three.
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<ShopifyOption>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: Vec<ShopifyVariant>,
}

impl ShopifyProduct {
    /// Decodes one raw product record.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Deserialize`] when the record does not match
    /// the product shape (missing `id`, wrong field types).
    pub fn from_record(record: Value) -> Result<Self, ScraperError> {
        let context = match record.get("id") {
            Some(id) => format!("product {id}"),
            None => "product without id".to_owned(),
        };
        serde_json::from_value(record)
            .map_err(|source| ScraperError::Deserialize { context, source })
    }

    /// Returns `true` when the product has a non-empty `published_at`.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.published_at
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// The handle when present and non-blank.
    #[must_use]
    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref().map(str::trim).filter(|h| !h.is_empty())
    }
}

/// A named variation axis such as `"Color"` with its ordered values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopifyOption {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<String>,
}

/// A single purchasable variant of a [`ShopifyProduct`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopifyVariant {
    pub id: i64,

    /// Stock-keeping unit. Frequently an empty string.
    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default, deserialize_with = "price_string")]
    pub price: String,

    #[serde(default, deserialize_with = "optional_price_string")]
    pub compare_at_price: Option<String>,

    /// `"shopify"` when Shopify tracks inventory, `null` otherwise.
    #[serde(default)]
    pub inventory_management: Option<String>,

    #[serde(default)]
    pub inventory_quantity: Option<i64>,

    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub available: bool,

    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub taxable: bool,

    /// Shipping weight in grams.
    #[serde(default)]
    pub grams: Option<i64>,

    #[serde(default)]
    pub barcode: Option<String>,

    #[serde(default)]
    pub featured_image: Option<ShopifyImage>,

    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
    #[serde(default)]
    pub option3: Option<String>,
}

impl ShopifyVariant {
    /// Option values in slot order; blank slots are `None`.
    #[must_use]
    pub fn option_values(&self) -> [Option<&str>; 3] {
        [&self.option1, &self.option2, &self.option3]
            .map(|v| v.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// A product or variant image.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopifyImage {
    #[serde(default)]
    pub id: Option<i64>,
    /// CDN URL, usually carrying a `?v=` cache-busting query.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
}

fn default_true() -> bool {
    true
}

fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    null_as_default(deserializer)
}

fn price_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_price_string(deserializer)?.unwrap_or_default())
}

/// Reads a price given as a string, a number, or `null`.
fn optional_price_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_owned())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a price string or number, got {other}"
        ))),
    }
}
