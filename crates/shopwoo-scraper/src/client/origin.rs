//! Store origin handling for the Shopify client.

use crate::error::ScraperError;

/// Reduces a shop URL to its `scheme://host[:port]` origin.
///
/// Users paste anything from a bare domain to a collection or product page;
/// the JSON endpoints always live at the store root.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidShopUrl`] when the value is not an
/// absolute `http(s)` URL.
pub fn store_origin(shop_url: &str) -> Result<String, ScraperError> {
    let trimmed = shop_url.trim();
    let url = reqwest::Url::parse(trimmed).map_err(|e| ScraperError::InvalidShopUrl {
        shop_url: shop_url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidShopUrl {
            shop_url: shop_url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }
    Ok(url.origin().ascii_serialization())
}

/// Host part of a shop URL for log fields and error messages.
pub(super) fn shop_domain(shop_url: &str) -> String {
    reqwest::Url::parse(shop_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| shop_url.to_owned())
}
