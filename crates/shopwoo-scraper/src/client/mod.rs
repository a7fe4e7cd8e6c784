//! HTTP client for a Shopify storefront's public JSON endpoints.

mod crawl;
mod origin;

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub use crawl::{CrawlOptions, CrawlSummary};
pub use origin::store_origin;

/// HTTP client for `products.json` and `products/<handle>.json`.
///
/// Product records are returned as raw [`serde_json::Value`]s: crawled pages
/// are written to batch files verbatim and decoded into
/// [`crate::ShopifyProduct`] only when replayed, so one malformed record
/// never poisons a whole page.
///
/// Transient errors (429, 5xx, network failures) are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct ShopifyClient {
    client: Client,
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl ShopifyClient {
    /// Creates a `ShopifyClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one page of raw product records.
    ///
    /// `page` is 1-based. An empty vector means the catalog is exhausted.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidShopUrl`] if `shop_url` has no usable origin.
    /// - [`ScraperError::RateLimited`] / [`ScraperError::Http`] after retries.
    /// - [`ScraperError::NotFound`] / [`ScraperError::UnexpectedStatus`] for
    ///   other non-2xx responses.
    /// - [`ScraperError::Deserialize`] if the body is not a products page.
    pub async fn fetch_products_page(
        &self,
        shop_url: &str,
        limit: u32,
        page: u32,
    ) -> Result<Vec<Value>, ScraperError> {
        let url = Self::products_url(shop_url, limit, page)?;
        let body = self.get_json(&url, shop_url).await?;

        match body {
            Value::Object(mut map) => match map.remove("products") {
                Some(Value::Array(products)) => Ok(products),
                Some(Value::Null) | None => Ok(Vec::new()),
                Some(other) => Err(unexpected_shape(&url, &other)),
            },
            other => Err(unexpected_shape(&url, &other)),
        }
    }

    /// Fetches a single raw product record by handle.
    ///
    /// Reads the `product` member, falling back to the first entry of a
    /// `products` array for storefront apps that wrap single products that
    /// way.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_products_page`], plus
    /// [`ScraperError::MissingProduct`] when the body holds no product.
    pub async fn fetch_product_by_handle(
        &self,
        shop_url: &str,
        handle: &str,
    ) -> Result<Value, ScraperError> {
        let url = Self::product_url(shop_url, handle)?;
        let mut body = self.get_json(&url, shop_url).await?;

        let wrapped = body.get_mut("product").map(Value::take);
        let product = match wrapped {
            Some(product @ Value::Object(_)) => Some(product),
            _ => body
                .get_mut("products")
                .and_then(Value::as_array_mut)
                .filter(|products| !products.is_empty())
                .map(|products| products.swap_remove(0)),
        };

        product
            .filter(|p| p.as_object().is_some_and(|o| !o.is_empty()))
            .ok_or(ScraperError::MissingProduct { url })
    }

    async fn get_json(&self, url: &str, shop_url: &str) -> Result<Value, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(ScraperError::RateLimited {
                    domain: origin::shop_domain(shop_url),
                    retry_after_secs,
                });
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ScraperError::NotFound {
                    url: url.to_owned(),
                });
            }

            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }

            let body = response.text().await?;
            serde_json::from_str::<Value>(&body).map_err(|e| ScraperError::Deserialize {
                context: format!("response from {url}"),
                source: e,
            })
        })
        .await
    }

    /// Builds `<origin>/products.json?limit=..&page=..`.
    fn products_url(shop_url: &str, limit: u32, page: u32) -> Result<String, ScraperError> {
        let mut url = Self::endpoint(shop_url, &["products.json"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("page", &page.to_string());
        Ok(url.to_string())
    }

    /// Builds `<origin>/products/<handle>.json` with the handle escaped as a
    /// single path segment.
    fn product_url(shop_url: &str, handle: &str) -> Result<String, ScraperError> {
        let url = Self::endpoint(shop_url, &["products", &format!("{handle}.json")])?;
        Ok(url.to_string())
    }

    fn endpoint(shop_url: &str, segments: &[&str]) -> Result<reqwest::Url, ScraperError> {
        let origin = store_origin(shop_url)?;
        let mut url = reqwest::Url::parse(&origin).map_err(|e| ScraperError::InvalidShopUrl {
            shop_url: shop_url.to_owned(),
            reason: format!("origin \"{origin}\" is not a valid URL base: {e}"),
        })?;
        url.path_segments_mut()
            .map_err(|()| ScraperError::InvalidShopUrl {
                shop_url: shop_url.to_owned(),
                reason: "URL cannot carry a path".to_owned(),
            })?
            .clear()
            .extend(segments);
        Ok(url)
    }
}

fn unexpected_shape(url: &str, body: &Value) -> ScraperError {
    let kind = match body {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    ScraperError::Deserialize {
        context: format!("products page from {url}"),
        source: serde::de::Error::custom(format!("expected a `products` array, got {kind}")),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
