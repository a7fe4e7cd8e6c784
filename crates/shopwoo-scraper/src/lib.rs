pub mod batch;
pub mod client;
pub mod error;
pub mod handle;
mod rate_limit;
pub mod types;

pub use batch::BatchStore;
pub use client::{CrawlOptions, CrawlSummary, ShopifyClient};
pub use error::ScraperError;
pub use handle::{extract_handle, parse_selectors};
pub use types::{
    ShopifyImage, ShopifyOption, ShopifyProduct, ShopifyVariant, StringOrList,
};
