//! WooCommerce REST v3 request payloads.
//!
//! Only the fields the migration writes are modelled. Empty collections and
//! absent optionals are left out of the JSON so an update never clears data
//! the source simply did not provide.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Simple,
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Publish,
    Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaxStatus {
    #[serde(rename = "taxable")]
    Taxable,
    #[serde(rename = "none")]
    NonTaxable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WooImage {
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A product-level attribute: a named axis with its full value list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WooAttribute {
    pub name: String,
    pub visible: bool,
    pub variation: bool,
    pub options: Vec<String>,
}

/// One attribute value, used both for a variation's attributes and for a
/// product's default attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeOption {
    pub name: String,
    pub option: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaEntry {
    pub key: String,
    pub value: Value,
}

impl MetaEntry {
    pub fn new(key: &str, value: impl Into<Value>) -> Self {
        Self {
            key: key.to_owned(),
            value: value.into(),
        }
    }
}

/// Reference to a category, tag, or brand term by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TermRef {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WooProduct {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub sku: String,
    pub regular_price: String,
    pub sale_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short_description: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<WooImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta_data: Vec<MetaEntry>,
    pub weight: String,
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<WooAttribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub default_attributes: Vec<AttributeOption>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<TermRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TermRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub brands: Vec<TermRef>,
}

impl WooProduct {
    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.product_type == ProductType::Variable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WooVariation {
    pub regular_price: String,
    pub sale_price: String,
    pub sku: String,
    pub manage_stock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    pub in_stock: bool,
    pub tax_status: TaxStatus,
    pub weight: String,
    pub attributes: Vec<AttributeOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<WooImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta_data: Vec<MetaEntry>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
}

/// The handful of fields read back from a product lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
}

/// An existing variation as listed under `products/{id}/variations`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariationSummary {
    pub id: i64,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub attributes: Vec<AttributeOption>,
}

/// Reads a term or product id that may be a JSON number or a numeric string.
#[must_use]
pub fn id_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
