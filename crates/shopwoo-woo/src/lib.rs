pub mod client;
pub mod error;
pub mod response;
mod retry;
pub mod types;

pub use client::{WooClient, WooSettings};
pub use error::WooError;
pub use response::{ApiResponse, IMAGE_UPLOAD_ERROR};
pub use types::{
    id_of, AttributeOption, MetaEntry, ProductStatus, ProductSummary, ProductType, TaxStatus,
    TermRef, VariationSummary, WooAttribute, WooImage, WooProduct, WooVariation,
};
