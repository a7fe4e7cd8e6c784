//! Import runs for the CLI.
//!
//! Every run ends in the same per-product loop: decode the record, upsert
//! it, print one outcome line. A product that fails for any reason is
//! counted and the loop moves on.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use shopwoo_core::AppConfig;
use shopwoo_migrate::{
    ImportPolicy, Importer, RunSummary, UpsertError, UpsertOutcome, VariationTally,
};
use shopwoo_scraper::{parse_selectors, BatchStore, CrawlOptions, ShopifyClient, ShopifyProduct};
use shopwoo_woo::{WooClient, WooSettings};

use crate::Commands;

/// A fully resolved run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Plan {
    Crawl {
        shop_url: String,
        out_dir: PathBuf,
        page_size: u32,
        import: bool,
    },
    Replay {
        dir: PathBuf,
    },
    Targeted {
        shop_url: String,
        handles: Vec<String>,
    },
}

impl Plan {
    /// Resolves a subcommand, filling unset flags from the config.
    pub(crate) fn from_command(command: Commands, config: &AppConfig) -> anyhow::Result<Self> {
        match command {
            Commands::Crawl {
                shop_url,
                out_dir,
                page_size,
                no_import,
            } => Ok(Self::Crawl {
                shop_url: resolve_shop_url(shop_url, config)?,
                out_dir: out_dir.unwrap_or_else(|| config.export_dir.clone()),
                page_size: page_size.unwrap_or(config.page_size),
                import: !no_import,
            }),
            Commands::Replay { dir } => Ok(Self::Replay {
                dir: dir.unwrap_or_else(|| config.export_dir.clone()),
            }),
            Commands::Products {
                shop_url,
                selectors,
            } => {
                let handles = handles_from(&selectors);
                if handles.is_empty() {
                    anyhow::bail!("no product handles found in {selectors:?}");
                }
                Ok(Self::Targeted {
                    shop_url: resolve_shop_url(shop_url, config)?,
                    handles,
                })
            }
        }
    }

    /// The run implied by the environment alone, or `None` when no store URL
    /// is configured.
    ///
    /// With `SHOPIFY_PRODUCT_INPUT` set this is a targeted import, otherwise
    /// a full crawl followed by an import. A product input that holds no
    /// handles is an error, never a silent full crawl.
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Option<Self>> {
        let Some(shop_url) = config.shopify_base_url.clone() else {
            return Ok(None);
        };
        let Some(input) = &config.shopify_product_input else {
            return Ok(Some(Self::full_crawl(shop_url, config)));
        };

        let handles = handles_from(input);
        if handles.is_empty() {
            anyhow::bail!("SHOPIFY_PRODUCT_INPUT is set but holds no product handles");
        }
        Ok(Some(Self::Targeted { shop_url, handles }))
    }

    pub(crate) fn full_crawl(shop_url: String, config: &AppConfig) -> Self {
        Self::Crawl {
            shop_url,
            out_dir: config.export_dir.clone(),
            page_size: config.page_size,
            import: true,
        }
    }
}

fn resolve_shop_url(flag: Option<String>, config: &AppConfig) -> anyhow::Result<String> {
    flag.map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
        .or_else(|| config.shopify_base_url.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no Shopify store URL; pass --shop-url or set SHOPIFY_BASE_URL")
        })
}

pub(crate) fn handles_from(selectors: &[String]) -> Vec<String> {
    let mut handles: Vec<String> = Vec::new();
    for handle in selectors.iter().flat_map(|s| parse_selectors(s)) {
        if !handles.contains(&handle) {
            handles.push(handle);
        }
    }
    handles
}

/// Executes `plan` to completion.
///
/// # Errors
///
/// Returns an error when a client cannot be built, the first crawl page
/// fails, or the batch directory cannot be read. Per-product failures are
/// reported and counted, not returned.
pub(crate) async fn run(plan: Plan, config: &AppConfig) -> anyhow::Result<()> {
    match plan {
        Plan::Crawl {
            shop_url,
            out_dir,
            page_size,
            import,
        } => {
            let scraper = build_shopify_client(config)?;
            let store = BatchStore::new(out_dir);
            let options = CrawlOptions {
                page_size,
                max_pages: config.max_pages,
                ..CrawlOptions::default()
            };
            let crawl = scraper.crawl_to_batches(&shop_url, &options, &store).await?;

            println!(
                "saved {} products in {} batch files under {}",
                crawl.products,
                crawl.files.len(),
                store.dir().display()
            );
            if let Some(reason) = &crawl.stopped_by {
                println!("crawl stopped early: {reason}");
            }
            if crawl.hit_page_limit {
                println!(
                    "page limit of {} reached; the catalog may be incomplete",
                    config.max_pages
                );
            }

            if import {
                import_files(&crawl.files, config).await
            } else {
                Ok(())
            }
        }
        Plan::Replay { dir } => {
            let store = BatchStore::new(dir);
            let files = store.list().await?;
            if files.is_empty() {
                println!("no batch files found in {}", store.dir().display());
                return Ok(());
            }
            import_files(&files, config).await
        }
        Plan::Targeted { shop_url, handles } => import_handles(&shop_url, &handles, config).await,
    }
}

async fn import_files(files: &[PathBuf], config: &AppConfig) -> anyhow::Result<()> {
    let client = WooClient::new(&woo_settings(config))?;
    let importer = Importer::new(&client, import_policy(config)?);
    let mut summary = RunSummary::default();

    for path in files {
        let records = match BatchStore::load(path).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "failed to read batch file, skipping"
                );
                eprintln!("error: {e}");
                continue;
            }
        };
        tracing::info!(path = %path.display(), count = records.len(), "importing batch");
        for record in records {
            import_record(&importer, record, &mut summary).await;
        }
    }

    println!("{summary}");
    Ok(())
}

async fn import_handles(
    shop_url: &str,
    handles: &[String],
    config: &AppConfig,
) -> anyhow::Result<()> {
    let scraper = build_shopify_client(config)?;
    let client = WooClient::new(&woo_settings(config))?;
    let importer = Importer::new(&client, import_policy(config)?);
    let mut summary = RunSummary::default();

    for handle in handles {
        match scraper.fetch_product_by_handle(shop_url, handle).await {
            Ok(record) => import_record(&importer, record, &mut summary).await,
            Err(e) => {
                tracing::error!(handle = %handle, error = %e, "failed to fetch product");
                println!("failed   {handle}: {e}");
                summary.record_failure();
            }
        }
    }

    println!("{summary}");
    Ok(())
}

async fn import_record(importer: &Importer<'_>, record: Value, summary: &mut RunSummary) {
    let product = match ShopifyProduct::from_record(record) {
        Ok(product) => product,
        Err(e) => {
            tracing::error!(error = %e, "skipping undecodable product record");
            println!("failed   {e}");
            summary.record_failure();
            return;
        }
    };

    let result = importer.upsert(&product).await;
    if let Err(e) = &result {
        tracing::error!(
            id = product.id,
            title = %product.title,
            error = %e,
            "product import failed"
        );
    }
    println!("{}", outcome_line(&product.title, &result));
    summary.record(&result);
}

/// One line per product, e.g. `created  Hoodie (id 600, 2/2 variations)`.
pub(crate) fn outcome_line(title: &str, result: &Result<UpsertOutcome, UpsertError>) -> String {
    match result {
        Ok(UpsertOutcome::Created {
            product_id,
            variations,
        }) => format!("created  {title} {}", saved_note(*product_id, variations)),
        Ok(UpsertOutcome::Updated {
            product_id,
            variations,
        }) => format!("updated  {title} {}", saved_note(*product_id, variations)),
        Ok(UpsertOutcome::Skipped { existing_id }) => {
            format!("skipped  {title} (already exists as id {existing_id})")
        }
        Err(e) => format!("failed   {title}: {e}"),
    }
}

fn saved_note(product_id: i64, variations: &VariationTally) -> String {
    let total = variations.submitted + variations.failed;
    if total == 0 {
        format!("(id {product_id})")
    } else {
        format!(
            "(id {product_id}, {}/{total} variations)",
            variations.submitted
        )
    }
}

fn build_shopify_client(config: &AppConfig) -> anyhow::Result<ShopifyClient> {
    ShopifyClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Shopify client: {e}"))
}

pub(crate) fn woo_settings(config: &AppConfig) -> WooSettings {
    WooSettings {
        base_url: config.woo_base_url.clone(),
        consumer_key: config.woo_consumer_key.clone(),
        consumer_secret: config.woo_consumer_secret.clone(),
        query_string_auth: config.woo_query_string_auth,
        timeout_secs: config.woo_request_timeout_secs,
        max_retries: config.woo_max_retries,
        backoff_base_ms: config.woo_retry_backoff_base_ms,
    }
}

pub(crate) fn import_policy(config: &AppConfig) -> anyhow::Result<ImportPolicy> {
    let image_retry_backoff = Duration::try_from_secs_f64(config.image_retry_backoff_secs)
        .map_err(|e| anyhow::anyhow!("invalid IMAGE_RETRY_BACKOFF: {e}"))?;
    Ok(ImportPolicy {
        update_existing: config.update_existing,
        image_upload_retries: config.image_upload_retries,
        image_retry_backoff,
    })
}
