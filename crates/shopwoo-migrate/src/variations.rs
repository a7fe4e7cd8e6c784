//! Storefront variants → store variation payloads.

use shopwoo_scraper::{ShopifyProduct, ShopifyVariant};
use shopwoo_woo::{
    AttributeOption, MetaEntry, TaxStatus, VariationSummary, WooImage, WooVariation,
};

use crate::mapper::{alt_or_title, option_pairs};
use crate::pricing::{grams_to_kg, price_fields, strip_query};
use crate::sku::{SkuAllocator, SkuRequest};

/// The variant's own SKU, or its id when the SKU is blank.
#[must_use]
pub fn desired_sku(variant: &ShopifyVariant) -> String {
    variant
        .sku
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or_else(|| variant.id.to_string(), str::to_owned)
}

/// A variation payload and, when the product already has a matching
/// variation, that variation's id.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedVariation {
    pub existing_id: Option<i64>,
    pub payload: WooVariation,
}

/// Builds every variation of `source` in order.
///
/// Each variant is paired with at most one of the product's `existing`
/// variations, first by SKU and then by attribute values. A paired variant
/// keeps the SKU its variation already holds; the rest get one through
/// `allocator`.
pub async fn build_variations(
    source: &ShopifyProduct,
    parent_grams: i64,
    parent_image: Option<&str>,
    allocator: &SkuAllocator<'_>,
    existing: &[VariationSummary],
) -> Vec<PlannedVariation> {
    let mut claimed = vec![false; existing.len()];
    let mut planned = Vec::with_capacity(source.variants.len());

    for (index, variant) in source.variants.iter().enumerate() {
        let desired = desired_sku(variant);
        let matched = match_existing(
            existing,
            &claimed,
            &desired,
            &option_pairs(source, variant),
        );
        if let Some(i) = matched {
            claimed[i] = true;
        }

        let held = matched
            .map(|i| existing[i].sku.as_str())
            .filter(|sku| !sku.is_empty());
        let sku = match held {
            Some(sku) => sku.to_owned(),
            None => {
                allocator
                    .allocate(&SkuRequest {
                        desired: &desired,
                        product_id: source.id,
                        variant_id: variant.id,
                        handle: source.handle(),
                    })
                    .await
            }
        };

        planned.push(PlannedVariation {
            existing_id: matched.map(|i| existing[i].id),
            payload: build_variation(
                source,
                variant,
                sku,
                parent_grams,
                parent_image,
                index == 0,
            ),
        });
    }
    planned
}

/// Index of the first unclaimed variation holding `sku`, else of the first
/// unclaimed one with the same attribute values (names and values compared
/// case-insensitively).
pub(crate) fn match_existing(
    existing: &[VariationSummary],
    claimed: &[bool],
    sku: &str,
    options: &[AttributeOption],
) -> Option<usize> {
    let free = |i: &usize| !claimed.get(*i).copied().unwrap_or(false);
    (0..existing.len())
        .filter(free)
        .find(|&i| !existing[i].sku.is_empty() && existing[i].sku == sku)
        .or_else(|| {
            (0..existing.len())
                .filter(free)
                .find(|&i| same_options(&existing[i].attributes, options))
        })
}

fn same_options(have: &[AttributeOption], want: &[AttributeOption]) -> bool {
    let same = |a: &str, b: &str| a.trim().to_lowercase() == b.trim().to_lowercase();
    !want.is_empty()
        && have.len() == want.len()
        && want
            .iter()
            .all(|w| have.iter().any(|h| same(&h.name, &w.name) && same(&h.option, &w.option)))
}

/// Maps one variant given its already-allocated SKU. Performs no I/O.
///
/// `is_default` marks the variation the product page preselects (the first
/// one).
#[must_use]
pub fn build_variation(
    source: &ShopifyProduct,
    variant: &ShopifyVariant,
    sku: String,
    parent_grams: i64,
    parent_image: Option<&str>,
    is_default: bool,
) -> WooVariation {
    let (regular_price, sale_price) =
        price_fields(&variant.price, variant.compare_at_price.as_deref());
    let manage_stock = variant
        .inventory_management
        .as_deref()
        .is_some_and(|m| !m.trim().is_empty());

    let image = match &variant.featured_image {
        Some(own) if !own.src.trim().is_empty() => Some(WooImage {
            src: strip_query(&own.src),
            alt: Some(alt_or_title(own.alt.as_deref(), &source.title)),
        }),
        _ => parent_image.map(|src| WooImage {
            src: strip_query(src),
            alt: None,
        }),
    };

    let meta_data = variant
        .barcode
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(|barcode| vec![MetaEntry::new("_barcode", barcode)])
        .unwrap_or_default();

    WooVariation {
        regular_price,
        sale_price,
        sku,
        manage_stock,
        stock_quantity: if manage_stock {
            variant.inventory_quantity
        } else {
            None
        },
        in_stock: variant.available,
        tax_status: if variant.taxable {
            TaxStatus::Taxable
        } else {
            TaxStatus::NonTaxable
        },
        weight: grams_to_kg(variant.grams.unwrap_or(parent_grams)),
        attributes: option_pairs(source, variant),
        image,
        meta_data,
        default: is_default,
    }
}
