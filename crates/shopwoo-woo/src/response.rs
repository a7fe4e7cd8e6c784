//! Decoded store responses.

use serde_json::{json, Value};

use crate::error::WooError;
use crate::types::id_of;

/// Error code WooCommerce returns when it cannot sideload an image URL.
pub const IMAGE_UPLOAD_ERROR: &str = "woocommerce_product_image_upload_error";

/// Status and decoded body of one store request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Wraps a raw response body.
    ///
    /// A body that is not JSON (HTML error pages from a proxy, an empty
    /// body) becomes `{"code": null, "message": <raw text>}`.
    #[must_use]
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = serde_json::from_str(text)
            .unwrap_or_else(|_| json!({ "code": Value::Null, "message": text }));
        Self { status, body }
    }

    /// `true` for 200 and 201, the only statuses the store uses for a
    /// completed write.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    pub(crate) fn is_transient(&self) -> bool {
        self.status == 429 || self.status >= 500
    }

    /// The `code` member of an error body, e.g. `woocommerce_rest_product_invalid_id`.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("code").and_then(Value::as_str)
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    #[must_use]
    pub fn is_image_upload_error(&self) -> bool {
        self.error_code() == Some(IMAGE_UPLOAD_ERROR)
    }

    /// The `id` member of the body, as a number or numeric string.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.body.get("id").and_then(id_of)
    }

    /// Short human-readable description for logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.error_code(), self.message()) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (Some(code), None) => code.to_owned(),
            (None, Some(message)) => message.to_owned(),
            (None, None) => format!("HTTP {}", self.status),
        }
    }

    pub(crate) fn into_error(self, resource: &str) -> WooError {
        WooError::UnexpectedStatus {
            status: self.status,
            resource: resource.to_owned(),
            code: self.error_code().map(str::to_owned),
            message: self.describe(),
        }
    }
}
