//! Price, weight, and image URL helpers shared by the product and
//! variation transforms.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Splits a variant's prices into `(regular_price, sale_price)`.
///
/// When `compare_at` is a number strictly greater than `price` the item is
/// on sale: the compare-at price becomes the regular price and `price` the
/// sale price. Otherwise `price` is the regular price and the sale price is
/// empty. An unparseable compare-at price counts as no discount.
pub(crate) fn price_fields(price: &str, compare_at: Option<&str>) -> (String, String) {
    let price = price.trim();
    let discounted_from = compare_at
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .filter(|c| {
            let current = if price.is_empty() {
                Some(Decimal::ZERO)
            } else {
                Decimal::from_str(price).ok()
            };
            matches!(
                (Decimal::from_str(c).ok(), current),
                (Some(compare), Some(current)) if compare > current
            )
        });

    match discounted_from {
        Some(compare) => (compare.to_owned(), price.to_owned()),
        None => (price.to_owned(), String::new()),
    }
}

/// Grams to a kilogram string without trailing zeros: 500 → `"0.5"`,
/// 2000 → `"2"`.
pub(crate) fn grams_to_kg(grams: i64) -> String {
    (Decimal::from(grams) / Decimal::from(1000))
        .normalize()
        .to_string()
}

/// Drops the query string (Shopify's `?v=` cache buster) from a CDN URL.
pub(crate) fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or_default().trim().to_owned()
}
