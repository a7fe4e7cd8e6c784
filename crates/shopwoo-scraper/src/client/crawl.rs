//! Full-catalog crawl: page through `products.json` and persist each page
//! as a batch file.

use std::path::PathBuf;
use std::time::Duration;

use crate::batch::BatchStore;
use crate::error::ScraperError;

use super::ShopifyClient;

/// Paging limits for [`ShopifyClient::crawl_to_batches`].
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Records per page; the storefront caps this at 250.
    pub page_size: u32,
    /// Safety ceiling on the number of pages requested.
    pub max_pages: usize,
    /// Pause between page requests, skipped before the first page.
    pub inter_request_delay_ms: u64,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            page_size: 250,
            max_pages: 1000,
            inter_request_delay_ms: 0,
        }
    }
}

/// What a crawl produced.
#[derive(Debug, Default)]
pub struct CrawlSummary {
    /// Batch files written, in page order.
    pub files: Vec<PathBuf>,
    pub products: usize,
    /// `true` when the page ceiling stopped the crawl before an empty page.
    pub hit_page_limit: bool,
    /// Error that cut the crawl short after at least one page was saved.
    pub stopped_by: Option<String>,
}

impl ShopifyClient {
    /// Fetches every page of the catalog, writing page `n` to batch file `n`.
    ///
    /// Stops on the first empty page or after `max_pages` pages. A failure
    /// on a later page ends the crawl with the pages already saved (recorded
    /// in [`CrawlSummary::stopped_by`]) so they can still be replayed.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when the very first page fails, and
    /// [`ScraperError::Io`] when a batch file cannot be written.
    pub async fn crawl_to_batches(
        &self,
        shop_url: &str,
        options: &CrawlOptions,
        store: &BatchStore,
    ) -> Result<CrawlSummary, ScraperError> {
        let mut summary = CrawlSummary::default();
        let mut page: u32 = 1;

        loop {
            if summary.files.len() >= options.max_pages {
                tracing::warn!(
                    shop_url,
                    max_pages = options.max_pages,
                    "page ceiling reached, stopping crawl"
                );
                summary.hit_page_limit = true;
                break;
            }

            if page > 1 && options.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(options.inter_request_delay_ms)).await;
            }

            let products = match self
                .fetch_products_page(shop_url, options.page_size, page)
                .await
            {
                Ok(products) => products,
                Err(e) if summary.files.is_empty() => return Err(e),
                Err(e) => {
                    tracing::error!(shop_url, page, error = %e, "page fetch failed, stopping crawl");
                    summary.stopped_by = Some(e.to_string());
                    break;
                }
            };

            if products.is_empty() {
                tracing::info!(shop_url, page, "empty page, catalog exhausted");
                break;
            }

            let path = store.save(page as usize, &products).await?;
            tracing::info!(
                page,
                count = products.len(),
                path = %path.display(),
                "saved product batch"
            );
            summary.products += products.len();
            summary.files.push(path);
            page += 1;
        }

        Ok(summary)
    }
}
