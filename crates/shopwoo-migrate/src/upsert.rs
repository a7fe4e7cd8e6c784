//! Create-or-update of one product and its variations.
//!
//! ```text
//! LOOKUP ──▶ SKIP                      (exists, updates disabled)
//!    └─────▶ CREATE | UPDATE ──▶ VARIATIONS? ──▶ DONE
//!               │  ▲                 │  ▲
//!               ▼  │                 ▼  │
//!            IMAGE_RETRY          IMAGE_RETRY   (per variation)
//! ```
//!
//! On update, the product's current variations are listed first and each
//! source variant is written over the one it matches; only unmatched
//! variants are added.
//!
//! There is no transaction: a product can be created and some of its
//! variations rejected. Image-upload errors are the only rejection that is
//! retried, with a linear back-off of `backoff × attempt`.

use std::time::Duration;

use shopwoo_scraper::ShopifyProduct;
use shopwoo_woo::{ApiResponse, ProductSummary, VariationSummary, WooClient, WooProduct};

use crate::error::{UpsertError, VariationError};
use crate::mapper::map_product;
use crate::sku::SkuAllocator;
use crate::taxonomy::{TaxonomyKind, TaxonomyResolver, VendorResolution};
use crate::variations::{build_variations, PlannedVariation};

/// Run-wide import settings.
#[derive(Debug, Clone)]
pub struct ImportPolicy {
    /// Update products that already exist instead of skipping them.
    pub update_existing: bool,
    /// Retries after an image-upload rejection, per product and per variation.
    pub image_upload_retries: u32,
    /// Base wait between image retries; retry `n` waits `n` times this.
    pub image_retry_backoff: Duration,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            update_existing: true,
            image_upload_retries: 3,
            image_retry_backoff: Duration::from_secs(3),
        }
    }
}

/// Variations accepted and rejected for one product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariationTally {
    pub submitted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created {
        product_id: i64,
        variations: VariationTally,
    },
    Updated {
        product_id: i64,
        variations: VariationTally,
    },
    /// Already in the store and updates are disabled; nothing was written.
    Skipped { existing_id: i64 },
}

pub struct Importer<'a> {
    client: &'a WooClient,
    policy: ImportPolicy,
}

impl<'a> Importer<'a> {
    #[must_use]
    pub fn new(client: &'a WooClient, policy: ImportPolicy) -> Self {
        Self { client, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &ImportPolicy {
        &self.policy
    }

    /// Creates or updates `source` in the store.
    ///
    /// Existing products are matched by SKU, or by slug when the SKU is
    /// empty. Taxonomy terms that cannot be resolved and variations that are
    /// rejected are logged without failing the product.
    ///
    /// # Errors
    ///
    /// - [`UpsertError::Map`] when the source has no variants.
    /// - [`UpsertError::Woo`] / [`UpsertError::Deserialize`] when the lookup
    ///   or the product submission cannot be completed.
    /// - [`UpsertError::Rejected`] when the store refuses the product.
    /// - [`UpsertError::ImageRetriesExhausted`] when image uploads keep
    ///   failing past the retry limit.
    pub async fn upsert(&self, source: &ShopifyProduct) -> Result<UpsertOutcome, UpsertError> {
        let draft = map_product(source)?;
        let mut product = draft.product;
        let existing = self.find_existing(&product).await?;

        if let Some(existing) = &existing {
            if !self.policy.update_existing {
                tracing::info!(
                    id = existing.id,
                    name = %existing.name,
                    "product already exists, skipping"
                );
                return Ok(UpsertOutcome::Skipped {
                    existing_id: existing.id,
                });
            }
            if !existing.sku.is_empty() && existing.sku != product.sku {
                tracing::warn!(
                    id = existing.id,
                    existing_sku = %existing.sku,
                    sku = %product.sku,
                    "matched product has a different SKU, it will be overwritten"
                );
            }
        }

        let resolver = TaxonomyResolver::new(self.client);
        product.categories = resolver
            .ensure(TaxonomyKind::Category, &draft.categories)
            .await;
        product.tags = resolver.ensure(TaxonomyKind::Tag, &draft.tags).await;
        if let VendorResolution::Brand(term) = resolver
            .resolve_vendor(draft.vendor.as_deref(), &mut product.tags)
            .await
        {
            product.brands = vec![term];
        }

        let existing_id = existing.as_ref().map(|e| e.id);
        let response = self
            .submit_product(&source.title, existing_id, &product)
            .await?;
        let product_id = response.id().or(existing_id).ok_or_else(|| {
            UpsertError::MissingProductId {
                title: source.title.clone(),
            }
        })?;

        let variations = if product.is_variable() {
            self.save_variations(
                source,
                draft.parent_grams,
                draft.parent_image.as_deref(),
                product_id,
                existing_id.is_some(),
            )
            .await
        } else {
            VariationTally::default()
        };

        tracing::info!(
            product_id,
            title = %source.title,
            submitted = variations.submitted,
            failed = variations.failed,
            "product saved"
        );

        Ok(match existing_id {
            Some(_) => UpsertOutcome::Updated {
                product_id,
                variations,
            },
            None => UpsertOutcome::Created {
                product_id,
                variations,
            },
        })
    }

    /// Builds and submits the variations of a saved variable product.
    ///
    /// When the product already existed and its variations cannot be listed,
    /// nothing is submitted and every variant counts as failed.
    async fn save_variations(
        &self,
        source: &ShopifyProduct,
        parent_grams: i64,
        parent_image: Option<&str>,
        product_id: i64,
        existed: bool,
    ) -> VariationTally {
        let current = if existed {
            match self.existing_variations(product_id).await {
                Ok(current) => current,
                Err(e) => {
                    tracing::error!(
                        title = %source.title,
                        product_id,
                        error = %e,
                        "failed to list existing variations, none submitted"
                    );
                    return VariationTally {
                        submitted: 0,
                        failed: source.variants.len(),
                    };
                }
            }
        } else {
            Vec::new()
        };

        let planned = build_variations(
            source,
            parent_grams,
            parent_image,
            &SkuAllocator::new(self.client),
            &current,
        )
        .await;
        self.submit_variations(&source.title, product_id, &planned)
            .await
    }

    async fn existing_variations(
        &self,
        product_id: i64,
    ) -> Result<Vec<VariationSummary>, UpsertError> {
        let resource = format!("products/{product_id}/variations");
        let items = self.client.list(&resource, &[("per_page", "100")]).await?;
        items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|source| UpsertError::Deserialize {
                    context: format!("variations of product {product_id}"),
                    source,
                })
            })
            .collect()
    }

    async fn find_existing(
        &self,
        product: &WooProduct,
    ) -> Result<Option<ProductSummary>, UpsertError> {
        let (field, value) = if product.sku.is_empty() {
            ("slug", product.slug.as_str())
        } else {
            ("sku", product.sku.as_str())
        };
        let matches = self.client.list("products", &[(field, value)]).await?;
        let Some(first) = matches.into_iter().next() else {
            return Ok(None);
        };
        serde_json::from_value(first)
            .map(Some)
            .map_err(|source| UpsertError::Deserialize {
                context: format!("product lookup by {field}={value}"),
                source,
            })
    }

    /// POSTs (new) or PUTs (existing) the product, retrying image-upload
    /// rejections.
    async fn submit_product(
        &self,
        title: &str,
        existing_id: Option<i64>,
        product: &WooProduct,
    ) -> Result<ApiResponse, UpsertError> {
        let limit = self.policy.image_upload_retries;
        let mut attempt = 0u32;
        loop {
            let response = match existing_id {
                Some(id) => self.client.put(&format!("products/{id}"), product).await?,
                None => self.client.post("products", product).await?,
            };
            if response.is_success() {
                return Ok(response);
            }
            if !response.is_image_upload_error() {
                return Err(UpsertError::Rejected {
                    title: title.to_owned(),
                    status: response.status,
                    code: response.error_code().map(str::to_owned),
                    message: response.describe(),
                });
            }
            if attempt >= limit {
                return Err(UpsertError::ImageRetriesExhausted {
                    title: title.to_owned(),
                    attempts: limit,
                    message: response.describe(),
                });
            }

            attempt += 1;
            let wait = self.image_backoff(attempt);
            tracing::warn!(
                title,
                attempt,
                limit,
                wait_secs = wait.as_secs_f64(),
                "product image upload failed, retrying"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Submits variations in order, PUTting matched ones and POSTing the
    /// rest; a rejected one is counted and skipped.
    async fn submit_variations(
        &self,
        title: &str,
        product_id: i64,
        planned: &[PlannedVariation],
    ) -> VariationTally {
        let base = format!("products/{product_id}/variations");
        let mut tally = VariationTally::default();

        for variation in planned {
            let sku = &variation.payload.sku;
            match self.submit_variation(&base, variation).await {
                Ok(()) => {
                    tally.submitted += 1;
                    match variation.existing_id {
                        Some(id) => tracing::info!(product_id, id, sku = %sku, "variation updated"),
                        None => tracing::info!(product_id, sku = %sku, "variation added"),
                    }
                }
                Err(e) => {
                    tally.failed += 1;
                    tracing::error!(
                        title,
                        product_id,
                        sku = %sku,
                        error = %e,
                        "failed to save variation"
                    );
                }
            }
        }
        tally
    }

    async fn submit_variation(
        &self,
        base: &str,
        planned: &PlannedVariation,
    ) -> Result<(), VariationError> {
        let variation = &planned.payload;
        let limit = self.policy.image_upload_retries;
        let mut attempt = 0u32;
        loop {
            let response = match planned.existing_id {
                Some(id) => self.client.put(&format!("{base}/{id}"), variation).await?,
                None => self.client.post(base, variation).await?,
            };
            if response.is_success() {
                return Ok(());
            }
            if !response.is_image_upload_error() {
                return Err(VariationError::Rejected {
                    status: response.status,
                    message: response.describe(),
                });
            }
            if attempt >= limit {
                return Err(VariationError::ImageRetriesExhausted {
                    attempts: limit,
                    message: response.describe(),
                });
            }

            attempt += 1;
            let wait = self.image_backoff(attempt);
            tracing::warn!(
                sku = %variation.sku,
                attempt,
                limit,
                wait_secs = wait.as_secs_f64(),
                "variation image upload failed, retrying"
            );
            tokio::time::sleep(wait).await;
        }
    }

    fn image_backoff(&self, attempt: u32) -> Duration {
        self.policy.image_retry_backoff.saturating_mul(attempt)
    }
}
