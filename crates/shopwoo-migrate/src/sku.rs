//! Variation SKU allocation.
//!
//! The store rejects a variation whose SKU is already taken by any product
//! or variation. Before submitting, each desired SKU is checked and, when
//! taken, replaced by the first free candidate of a fixed fallback chain.
//! The check races other writers, so a duplicate can still slip through;
//! that shows up later as an ordinary variation failure.

use shopwoo_woo::{WooClient, WooError};

/// Identity of the variant whose SKU is being allocated.
#[derive(Debug, Clone, Copy)]
pub struct SkuRequest<'a> {
    pub desired: &'a str,
    pub product_id: i64,
    pub variant_id: i64,
    pub handle: Option<&'a str>,
}

impl SkuRequest<'_> {
    /// Fallback candidates in the order they are tried, skipping any that
    /// equal the desired SKU or an earlier candidate.
    #[must_use]
    pub fn fallbacks(&self) -> Vec<String> {
        let stem = self
            .handle
            .map_or_else(|| self.product_id.to_string(), str::to_owned);
        let chain = [
            self.variant_id.to_string(),
            format!("{}-{}", self.product_id, self.variant_id),
            format!("{stem}-{}", self.variant_id),
        ];

        let mut candidates: Vec<String> = Vec::with_capacity(chain.len());
        for candidate in chain {
            if candidate != self.desired && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }

    /// Last resort once every candidate is taken:
    /// `{product_id}-{variant_id}-{millis % 100000}`.
    #[must_use]
    pub fn timestamped(&self, unix_millis: i64) -> String {
        format!(
            "{}-{}-{}",
            self.product_id,
            self.variant_id,
            unix_millis.rem_euclid(100_000)
        )
    }
}

/// Checks SKUs against the store's product index.
pub struct SkuAllocator<'a> {
    client: &'a WooClient,
}

impl<'a> SkuAllocator<'a> {
    #[must_use]
    pub fn new(client: &'a WooClient) -> Self {
        Self { client }
    }

    /// `true` when a product or variation already uses `sku`.
    ///
    /// # Errors
    ///
    /// Returns the [`WooError`] from the `products?sku=` lookup, including
    /// [`WooError::UnexpectedStatus`] for an error status.
    pub async fn exists(&self, sku: &str) -> Result<bool, WooError> {
        let matches = self.client.list("products", &[("sku", sku)]).await?;
        Ok(!matches.is_empty())
    }

    /// Returns a SKU that was free at check time.
    ///
    /// Never fails: when the store cannot be queried the desired SKU is
    /// returned unchanged and the submission decides.
    pub async fn allocate(&self, request: &SkuRequest<'_>) -> String {
        match self.try_allocate(request).await {
            Ok(sku) => sku,
            Err(e) => {
                tracing::warn!(
                    sku = request.desired,
                    error = %e,
                    "SKU availability check failed, keeping desired SKU"
                );
                request.desired.to_owned()
            }
        }
    }

    async fn try_allocate(&self, request: &SkuRequest<'_>) -> Result<String, WooError> {
        if !self.exists(request.desired).await? {
            return Ok(request.desired.to_owned());
        }

        for candidate in request.fallbacks() {
            if !self.exists(&candidate).await? {
                tracing::info!(
                    desired = request.desired,
                    sku = %candidate,
                    "SKU taken, using fallback"
                );
                return Ok(candidate);
            }
        }

        let sku = request.timestamped(chrono::Utc::now().timestamp_millis());
        tracing::warn!(
            desired = request.desired,
            sku = %sku,
            "every fallback SKU taken, using timestamped SKU"
        );
        Ok(sku)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(desired: &'a str, handle: Option<&'a str>) -> SkuRequest<'a> {
        SkuRequest {
            desired,
            product_id: 100,
            variant_id: 7,
            handle,
        }
    }

    #[test]
    fn fallbacks_follow_fixed_order() {
        assert_eq!(
            request("TEE", Some("tee")).fallbacks(),
            vec!["7", "100-7", "tee-7"]
        );
    }

    #[test]
    fn fallbacks_skip_desired_and_duplicates() {
        // Without a handle the third candidate repeats the second.
        assert_eq!(request("7", None).fallbacks(), vec!["100-7"]);
    }

    #[test]
    fn timestamped_sku_keeps_five_digit_suffix() {
        let req = request("TEE", Some("tee"));
        assert_eq!(req.timestamped(1_700_000_123_456), "100-7-23456");
        assert_eq!(req.timestamped(42), "100-7-42");
    }
}
