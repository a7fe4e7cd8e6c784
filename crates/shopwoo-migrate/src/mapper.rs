//! Storefront product → store product payload.

use shopwoo_scraper::{ShopifyProduct, ShopifyVariant, StringOrList};
use shopwoo_woo::{
    AttributeOption, MetaEntry, ProductStatus, ProductType, WooAttribute, WooImage, WooProduct,
};

use crate::error::MapError;
use crate::pricing::{grams_to_kg, price_fields, strip_query};

/// A mapped product plus the inputs the upsert still has to resolve against
/// the store (taxonomy names, vendor) or hand to the variation builder.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    /// Payload with `categories`, `tags` and `brands` still empty.
    pub product: WooProduct,
    /// Category names from `product_type`, in source order.
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub vendor: Option<String>,
    /// First variant's weight, inherited by variants without their own.
    pub parent_grams: i64,
    /// First product image, the fallback for variants without one.
    pub parent_image: Option<String>,
}

/// Maps one storefront product. Performs no I/O.
///
/// # Errors
///
/// Returns [`MapError::NoVariants`] when the product has no variants.
pub fn map_product(source: &ShopifyProduct) -> Result<ProductDraft, MapError> {
    let first = source.variants.first().ok_or(MapError::NoVariants {
        product_id: source.id,
    })?;
    let is_variable = source.variants.len() > 1;
    let parent_grams = first.grams.unwrap_or(0);

    let (regular_price, sale_price) = if is_variable {
        (String::new(), String::new())
    } else {
        price_fields(&first.price, first.compare_at_price.as_deref())
    };

    let (attributes, default_attributes) = if is_variable {
        (attributes(source), option_pairs(source, first))
    } else {
        (Vec::new(), Vec::new())
    };

    let product = WooProduct {
        name: source.title.clone(),
        product_type: if is_variable {
            ProductType::Variable
        } else {
            ProductType::Simple
        },
        sku: parent_sku(source, first, is_variable),
        regular_price,
        sale_price,
        description: source.body_html.clone(),
        short_description: String::new(),
        slug: slug(source),
        images: images(source),
        meta_data: vec![
            MetaEntry::new("_vendor", source.vendor.clone()),
            MetaEntry::new("_shopify_id", source.id),
            MetaEntry::new("_handle", source.handle.clone()),
        ],
        weight: grams_to_kg(parent_grams),
        status: if source.is_published() {
            ProductStatus::Publish
        } else {
            ProductStatus::Draft
        },
        attributes,
        default_attributes,
        categories: Vec::new(),
        tags: Vec::new(),
        brands: Vec::new(),
    };

    Ok(ProductDraft {
        product,
        categories: category_names(source.product_type.as_ref()),
        tags: tag_names(&source.tags),
        vendor: source
            .vendor
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned),
        parent_grams,
        parent_image: source
            .images
            .first()
            .map(|image| image.src.clone())
            .filter(|src| !src.trim().is_empty()),
    })
}

/// The handle, or the title lower-cased with spaces turned into hyphens.
fn slug(source: &ShopifyProduct) -> String {
    match source.handle() {
        Some(handle) => handle.to_owned(),
        None => source.title.trim().to_lowercase().replace(' ', "-"),
    }
}

/// Variable products are keyed by handle (or id) since their variants carry
/// the real SKUs; simple products use the variant's SKU when it has one.
fn parent_sku(source: &ShopifyProduct, first: &ShopifyVariant, is_variable: bool) -> String {
    let variant_sku = first
        .sku
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !is_variable);
    variant_sku
        .or_else(|| source.handle())
        .map_or_else(|| source.id.to_string(), str::to_owned)
}

fn images(source: &ShopifyProduct) -> Vec<WooImage> {
    source
        .images
        .iter()
        .filter(|image| !image.src.trim().is_empty())
        .map(|image| WooImage {
            src: strip_query(&image.src),
            alt: Some(alt_or_title(image.alt.as_deref(), &source.title)),
        })
        .collect()
}

pub(crate) fn alt_or_title(alt: Option<&str>, title: &str) -> String {
    alt.map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(title)
        .to_owned()
}

fn attributes(source: &ShopifyProduct) -> Vec<WooAttribute> {
    source
        .options
        .iter()
        .filter(|option| !option.values.is_empty())
        .map(|option| WooAttribute {
            name: option.name.clone(),
            visible: true,
            variation: true,
            options: option.values.clone(),
        })
        .collect()
}

/// `(option name, value)` for every filled slot of `variant` that has a
/// matching option on the product, paired by slot. For the first variant
/// this is the product's default attribute set.
pub(crate) fn option_pairs(
    source: &ShopifyProduct,
    variant: &ShopifyVariant,
) -> Vec<AttributeOption> {
    variant
        .option_values()
        .into_iter()
        .zip(&source.options)
        .filter_map(|(value, option)| {
            value.map(|value| AttributeOption {
                name: option.name.clone(),
                option: value.to_owned(),
            })
        })
        .collect()
}

/// Category names from `product_type`: a string is split on `:`, `/` and `,`.
fn category_names(product_type: Option<&StringOrList>) -> Vec<String> {
    match product_type {
        None => Vec::new(),
        Some(StringOrList::Text(text)) => clean(text.split([':', '/', ','])),
        Some(StringOrList::List(items)) => clean(items.iter().map(String::as_str)),
    }
}

fn tag_names(tags: &StringOrList) -> Vec<String> {
    match tags {
        StringOrList::Text(text) => clean(text.split(',')),
        StringOrList::List(items) => clean(items.iter().map(String::as_str)),
    }
}

fn clean<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod tests;
