use thiserror::Error;

/// Errors returned by the WooCommerce REST client.
///
/// Error *statuses* from the store are not errors at this layer: they come
/// back as an [`crate::ApiResponse`] so callers can branch on the error code.
/// Only [`crate::WooClient::list`] turns a non-2xx status into
/// [`WooError::UnexpectedStatus`].
#[derive(Debug, Error)]
pub enum WooError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid store URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("JSON serialization error for {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {resource}: {message}")]
    UnexpectedStatus {
        status: u16,
        resource: String,
        code: Option<String>,
        message: String,
    },
}
