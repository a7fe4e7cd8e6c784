use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    /// Root URL of the WordPress site, e.g. `https://shop.example.com`.
    pub woo_base_url: String,
    pub woo_consumer_key: String,
    pub woo_consumer_secret: String,
    /// Send credentials as query parameters instead of basic auth.
    pub woo_query_string_auth: bool,
    pub woo_request_timeout_secs: u64,
    pub woo_max_retries: u32,
    pub woo_retry_backoff_base_ms: u64,
    /// When `false`, products already present in the store are skipped.
    pub update_existing: bool,
    pub image_upload_retries: u32,
    pub image_retry_backoff_secs: f64,
    pub shopify_base_url: Option<String>,
    /// Product handles or product URLs for a targeted import. `Some` whenever
    /// the variable is set, even if splitting it left no entries.
    pub shopify_product_input: Option<Vec<String>>,
    pub export_dir: PathBuf,
    pub page_size: u32,
    pub max_pages: usize,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("woo_base_url", &self.woo_base_url)
            .field("woo_consumer_key", &"[redacted]")
            .field("woo_consumer_secret", &"[redacted]")
            .field("woo_query_string_auth", &self.woo_query_string_auth)
            .field("woo_request_timeout_secs", &self.woo_request_timeout_secs)
            .field("woo_max_retries", &self.woo_max_retries)
            .field("woo_retry_backoff_base_ms", &self.woo_retry_backoff_base_ms)
            .field("update_existing", &self.update_existing)
            .field("image_upload_retries", &self.image_upload_retries)
            .field("image_retry_backoff_secs", &self.image_retry_backoff_secs)
            .field("shopify_base_url", &self.shopify_base_url)
            .field("shopify_product_input", &self.shopify_product_input)
            .field("export_dir", &self.export_dir)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field("log_level", &self.log_level)
            .finish()
    }
}
