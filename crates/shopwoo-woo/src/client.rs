//! HTTP client for the WooCommerce REST API (`/wp-json/wc/v3/`).

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde_json::Value;

use crate::error::WooError;
use crate::response::ApiResponse;
use crate::retry::retry_with_backoff;

const API_PATH: &str = "wp-json/wc/v3/";

/// Connection settings for [`WooClient`].
#[derive(Clone)]
pub struct WooSettings {
    /// Store root, e.g. `https://store.example.com` or `https://example.com/shop`.
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Send credentials as `consumer_key`/`consumer_secret` query parameters
    /// instead of an `Authorization` header.
    pub query_string_auth: bool,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl fmt::Debug for WooSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WooSettings")
            .field("base_url", &self.base_url)
            .field("consumer_key", &"[redacted]")
            .field("consumer_secret", &"[redacted]")
            .field("query_string_auth", &self.query_string_auth)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish()
    }
}

/// Client for the store's product resources.
///
/// Every call returns the status and decoded body as an [`ApiResponse`];
/// a 4xx is not an `Err`. Only transport failures (after retries) and
/// malformed requests surface as [`WooError`].
pub struct WooClient {
    client: Client,
    api_base: Url,
    consumer_key: String,
    consumer_secret: String,
    query_string_auth: bool,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl WooClient {
    /// Builds a client rooted at `<base_url>/wp-json/wc/v3/`.
    ///
    /// # Errors
    ///
    /// - [`WooError::InvalidBaseUrl`] if `base_url` is not an absolute
    ///   `http(s)` URL.
    /// - [`WooError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn new(settings: &WooSettings) -> Result<Self, WooError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shopwoo/0.1 (catalog-migration)")
            .build()?;

        Ok(Self {
            client,
            api_base: api_base(&settings.base_url)?,
            consumer_key: settings.consumer_key.clone(),
            consumer_secret: settings.consumer_secret.clone(),
            query_string_auth: settings.query_string_auth,
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// `GET <resource>?<query>`.
    ///
    /// # Errors
    ///
    /// See [`WooClient`]: transport failures and invalid resource paths.
    pub async fn get(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse, WooError> {
        self.send(Method::GET, resource, query, None).await
    }

    /// `POST <resource>` with a JSON body.
    ///
    /// # Errors
    ///
    /// Also returns [`WooError::Serialize`] if `body` cannot be encoded.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<ApiResponse, WooError> {
        let body = encode(resource, body)?;
        self.send(Method::POST, resource, &[], Some(&body)).await
    }

    /// `PUT <resource>` with a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::post`].
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<ApiResponse, WooError> {
        let body = encode(resource, body)?;
        self.send(Method::PUT, resource, &[], Some(&body)).await
    }

    /// `GET` that must answer 2xx with a JSON array.
    ///
    /// # Errors
    ///
    /// - [`WooError::UnexpectedStatus`] for any non-2xx status.
    /// - [`WooError::Deserialize`] if the body is not an array.
    pub async fn list(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<Value>, WooError> {
        let response = self.get(resource, query).await?;
        if !(200..300).contains(&response.status) {
            return Err(response.into_error(resource));
        }
        match response.body {
            Value::Array(items) => Ok(items),
            other => Err(WooError::Deserialize {
                context: format!("list of {resource}"),
                source: serde::de::Error::custom(format!("expected a JSON array, got {other}")),
            }),
        }
    }

    async fn send(
        &self,
        method: Method,
        resource: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, WooError> {
        let url = self.endpoint(resource, query)?;

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let method = method.clone();
            let url = url.clone();
            async move {
                let mut request = self.client.request(method.clone(), url);
                if !self.query_string_auth {
                    request = request.basic_auth(&self.consumer_key, Some(&self.consumer_secret));
                }
                if let Some(body) = body {
                    request = request.json(body);
                }
                let response = request.send().await?;
                let status = response.status().as_u16();
                let text = response.text().await?;
                tracing::debug!(method = %method, resource, status, "store request");
                Ok(ApiResponse::from_text(status, &text))
            }
        })
        .await
    }

    /// Resolves `resource` against the API root and appends the query, plus
    /// the credentials when query-string auth is on.
    fn endpoint(&self, resource: &str, query: &[(&str, &str)]) -> Result<Url, WooError> {
        let mut url = self
            .api_base
            .join(resource.trim_start_matches('/'))
            .map_err(|e| WooError::InvalidBaseUrl {
                url: format!("{}{resource}", self.api_base),
                reason: e.to_string(),
            })?;
        if !query.is_empty() || self.query_string_auth {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
            if self.query_string_auth {
                pairs.append_pair("consumer_key", &self.consumer_key);
                pairs.append_pair("consumer_secret", &self.consumer_secret);
            }
        }
        Ok(url)
    }
}

/// Normalises a store root into the REST API base, keeping any sub-path the
/// store is installed under.
fn api_base(base_url: &str) -> Result<Url, WooError> {
    let invalid = |reason: String| WooError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason,
    };
    let trimmed = base_url.trim();
    let root = Url::parse(&format!("{}/", trimmed.trim_end_matches('/')))
        .map_err(|e| invalid(e.to_string()))?;
    if !matches!(root.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme \"{}\"", root.scheme())));
    }
    root.join(API_PATH).map_err(|e| invalid(e.to_string()))
}

fn encode<B: Serialize + ?Sized>(resource: &str, body: &B) -> Result<Value, WooError> {
    serde_json::to_value(body).map_err(|source| WooError::Serialize {
        context: format!("request body for {resource}"),
        source,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
