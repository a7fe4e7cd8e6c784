//! Turning user input (product URLs or bare handles) into handles.

use std::sync::LazyLock;

use regex::Regex;

static PRODUCT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/products/([^/?#]+)").expect("valid product path regex"));

/// Extracts a product handle from a storefront URL or returns the input as a
/// handle.
///
/// `https://shop.example.com/collections/tees/products/blue-tee?variant=1`
/// yields `blue-tee`; anything without a `/products/<handle>` path is
/// trimmed of whitespace and surrounding slashes and used as-is.
#[must_use]
pub fn extract_handle(value: &str) -> String {
    let trimmed = value.trim();
    let path = reqwest::Url::parse(trimmed)
        .map_or_else(|_| trimmed.to_owned(), |u| u.path().to_owned());
    if let Some(handle) = PRODUCT_PATH
        .captures(&path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    {
        return handle.to_owned();
    }
    trimmed.trim_matches('/').to_owned()
}

/// Splits a comma-separated list of product URLs/handles into handles.
#[must_use]
pub fn parse_selectors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(extract_handle)
        .filter(|h| !h.is_empty())
        .collect()
}
