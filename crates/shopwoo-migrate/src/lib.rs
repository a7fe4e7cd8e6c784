//! Shopify → WooCommerce product migration.
//!
//! [`mapper`] and [`variations`] are pure transforms from the storefront
//! shape to store payloads. [`sku`] and [`taxonomy`] reconcile those payloads
//! with what the store already holds, and [`upsert`] drives one product
//! through lookup, submission, and variation creation.

pub mod error;
pub mod mapper;
mod pricing;
pub mod sku;
pub mod summary;
pub mod taxonomy;
pub mod upsert;
pub mod variations;

pub use error::{MapError, TaxonomyError, UpsertError, VariationError};
pub use mapper::{map_product, ProductDraft};
pub use sku::{SkuAllocator, SkuRequest};
pub use summary::RunSummary;
pub use taxonomy::{TaxonomyKind, TaxonomyResolver, VendorResolution};
pub use upsert::{ImportPolicy, Importer, UpsertOutcome, VariationTally};
pub use variations::{build_variation, build_variations, desired_sku, PlannedVariation};
