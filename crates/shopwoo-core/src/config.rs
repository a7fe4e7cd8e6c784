use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Each setting may be read under several names; the first name is the
/// canonical one reported in errors, the rest are accepted aliases. Empty
/// values count as unset.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let first_of = |names: &[&str]| -> Option<String> {
        names
            .iter()
            .filter_map(|name| lookup(name).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    };

    let require = |names: &[&str]| -> Result<String, ConfigError> {
        first_of(names).ok_or_else(|| ConfigError::MissingEnvVar(names[0].to_string()))
    };

    let or_default = |names: &[&str], default: &str| -> String {
        first_of(names).unwrap_or_else(|| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(&[var], default)
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(&[var], default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(&[var], default)
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let woo_base_url = require(&["WORDPRESS_URL", "wordpress_url"])?;
    let woo_consumer_key = require(&["CONSUMER_KEY", "consumer__key"])?;
    let woo_consumer_secret = require(&["CONSUMER_SECRET", "consumer__secret"])?;

    let update_existing = parse_flag(
        "WC_UPDATE_EXISTING",
        &or_default(&["WC_UPDATE_EXISTING", "wc_update_existing"], "true"),
    )?;
    let woo_query_string_auth = parse_flag(
        "WC_QUERY_STRING_AUTH",
        &or_default(&["WC_QUERY_STRING_AUTH"], "false"),
    )?;
    let woo_request_timeout_secs = parse_u64("WC_TIMEOUT", "60")?;
    let woo_max_retries = parse_u32("WC_MAX_RETRIES", "3")?;
    let woo_retry_backoff_base_ms = parse_u64("WC_RETRY_BACKOFF_MS", "1000")?;

    let image_upload_retries = parse_u32("IMAGE_UPLOAD_RETRY", "3")?;
    let image_retry_backoff_secs =
        parse_seconds("IMAGE_RETRY_BACKOFF", &or_default(&["IMAGE_RETRY_BACKOFF"], "3"))?;

    let shopify_base_url = first_of(&["SHOPIFY_BASE_URL", "shopify_base_url"]);
    let shopify_product_input = first_of(&[
        "SHOPIFY_PRODUCT_INPUT",
        "shopify_product_input",
        "SHOPIFY_PRODUCTS",
        "shopify_products",
    ])
    .map(|raw| split_list(&raw));

    let export_dir = PathBuf::from(or_default(&["SHOPWOO_EXPORT_DIR"], "shopify_export"));
    let page_size = parse_u32("SHOPWOO_PAGE_SIZE", "250")?;
    let max_pages = parse_usize("SHOPWOO_MAX_PAGES", "1000")?;

    let scraper_request_timeout_secs = parse_u64("SHOPWOO_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        &["SHOPWOO_SCRAPER_USER_AGENT"],
        "shopwoo/0.1 (catalog-migration)",
    );
    let scraper_max_retries = parse_u32("SHOPWOO_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("SHOPWOO_SCRAPER_RETRY_BACKOFF_BASE_SECS", "1")?;

    let log_level = or_default(&["SHOPWOO_LOG_LEVEL"], "info");

    Ok(AppConfig {
        woo_base_url,
        woo_consumer_key,
        woo_consumer_secret,
        woo_query_string_auth,
        woo_request_timeout_secs,
        woo_max_retries,
        woo_retry_backoff_base_ms,
        update_existing,
        image_upload_retries,
        image_retry_backoff_secs,
        shopify_base_url,
        shopify_product_input,
        export_dir,
        page_size,
        max_pages,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        log_level,
    })
}

/// Parse a boolean switch. Accepts `1/true/yes/y` and `0/false/no/n`,
/// case-insensitively.
fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

/// Parse a non-negative, finite number of seconds (fractions allowed).
fn parse_seconds(var: &str, raw: &str) -> Result<f64, ConfigError> {
    let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a non-negative number of seconds, got {raw}"),
        });
    }
    Ok(value)
}

/// Split a comma-separated list, trimming entries and dropping empties.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
