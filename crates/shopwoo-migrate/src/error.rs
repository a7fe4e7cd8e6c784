use shopwoo_woo::WooError;
use thiserror::Error;

use crate::taxonomy::TaxonomyKind;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("product {product_id} has no variants")]
    NoVariants { product_id: i64 },
}

/// Failure to find or create one taxonomy term.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("store request failed: {0}")]
    Woo(#[from] WooError),

    #[error("store rejected {kind} \"{name}\" (HTTP {status}): {message}")]
    Rejected {
        kind: TaxonomyKind,
        name: String,
        status: u16,
        message: String,
    },

    #[error("store returned no usable id for {kind} \"{name}\"")]
    MissingId { kind: TaxonomyKind, name: String },
}

/// Why one product could not be upserted. The caller logs it and moves on
/// to the next product.
#[derive(Debug, Error)]
pub enum UpsertError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error("store request failed: {0}")]
    Woo(#[from] WooError),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store rejected product \"{title}\" (HTTP {status}): {message}")]
    Rejected {
        title: String,
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("image upload for product \"{title}\" still failing after {attempts} retries: {message}")]
    ImageRetriesExhausted {
        title: String,
        attempts: u32,
        message: String,
    },

    #[error("store accepted product \"{title}\" but returned no id")]
    MissingProductId { title: String },
}

/// Why one variation was not created. Counted and logged; the product and
/// its remaining variations carry on.
#[derive(Debug, Error)]
pub enum VariationError {
    #[error("store request failed: {0}")]
    Woo(#[from] WooError),

    #[error("store rejected variation (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("image upload still failing after {attempts} retries: {message}")]
    ImageRetriesExhausted { attempts: u32, message: String },
}
