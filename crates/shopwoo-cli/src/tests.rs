use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use shopwoo_core::AppConfig;
use shopwoo_migrate::{MapError, UpsertError, UpsertOutcome, VariationTally};

use super::*;
use crate::import::{import_policy, outcome_line, woo_settings, Plan};

fn config() -> AppConfig {
    AppConfig {
        woo_base_url: "https://store.example.com".to_string(),
        woo_consumer_key: "ck_test".to_string(),
        woo_consumer_secret: "cs_test".to_string(),
        woo_query_string_auth: false,
        woo_request_timeout_secs: 60,
        woo_max_retries: 3,
        woo_retry_backoff_base_ms: 1000,
        update_existing: true,
        image_upload_retries: 3,
        image_retry_backoff_secs: 1.5,
        shopify_base_url: None,
        shopify_product_input: None,
        export_dir: PathBuf::from("shopify_export"),
        page_size: 250,
        max_pages: 1000,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "shopwoo/0.1 (catalog-migration)".to_string(),
        scraper_max_retries: 3,
        scraper_retry_backoff_base_secs: 1,
        log_level: "info".to_string(),
    }
}

fn with_shop(url: &str) -> AppConfig {
    AppConfig {
        shopify_base_url: Some(url.to_string()),
        ..config()
    }
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["shopwoo"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_crawl_defaults() {
    let cli = Cli::try_parse_from(["shopwoo", "crawl"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Crawl {
            shop_url: None,
            out_dir: None,
            page_size: None,
            no_import: false,
        })
    ));
}

#[test]
fn parses_crawl_flags() {
    let cli = Cli::try_parse_from([
        "shopwoo",
        "crawl",
        "--shop-url",
        "https://shop.example.com",
        "--out-dir",
        "exports",
        "--page-size",
        "50",
        "--no-import",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Crawl {
            shop_url: Some(ref url),
            out_dir: Some(ref dir),
            page_size: Some(50),
            no_import: true,
        }) if url == "https://shop.example.com" && dir == &PathBuf::from("exports")
    ));
}

#[test]
fn rejects_non_numeric_page_size() {
    assert!(Cli::try_parse_from(["shopwoo", "crawl", "--page-size", "lots"]).is_err());
}

#[test]
fn parses_replay_with_dir() {
    let cli = Cli::try_parse_from(["shopwoo", "replay", "--dir", "old"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Replay { dir: Some(ref d) }) if d == &PathBuf::from("old")
    ));
}

#[test]
fn products_requires_a_selector() {
    assert!(Cli::try_parse_from(["shopwoo", "products"]).is_err());
}

#[test]
fn parses_products_selectors() {
    let cli = Cli::try_parse_from(["shopwoo", "products", "blue-tee", "red-tee,green-tee"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Products { shop_url: None, ref selectors }) if selectors.len() == 2
    ));
}

#[test]
fn crawl_plan_fills_defaults_from_config() {
    let cli = Cli::try_parse_from(["shopwoo", "crawl"]).unwrap();
    let plan = Plan::from_command(cli.command.unwrap(), &with_shop("https://shop.example.com"))
        .unwrap();
    assert_eq!(
        plan,
        Plan::Crawl {
            shop_url: "https://shop.example.com".to_string(),
            out_dir: PathBuf::from("shopify_export"),
            page_size: 250,
            import: true,
        }
    );
}

#[test]
fn crawl_without_any_store_url_is_an_error() {
    let cli = Cli::try_parse_from(["shopwoo", "crawl"]).unwrap();
    let err = Plan::from_command(cli.command.unwrap(), &config()).unwrap_err();
    assert!(err.to_string().contains("SHOPIFY_BASE_URL"), "got: {err}");
}

#[test]
fn products_plan_extracts_and_dedupes_handles() {
    let cli = Cli::try_parse_from([
        "shopwoo",
        "products",
        "--shop-url",
        "https://shop.example.com",
        "https://shop.example.com/products/blue-tee?variant=1",
        "blue-tee, red-tee",
    ])
    .unwrap();
    let plan = Plan::from_command(cli.command.unwrap(), &config()).unwrap();
    assert_eq!(
        plan,
        Plan::Targeted {
            shop_url: "https://shop.example.com".to_string(),
            handles: vec!["blue-tee".to_string(), "red-tee".to_string()],
        }
    );
}

#[test]
fn environment_without_store_url_has_no_plan() {
    assert_eq!(Plan::from_config(&config()).unwrap(), None);
}

#[test]
fn environment_with_store_url_crawls_everything() {
    let plan = Plan::from_config(&with_shop("https://shop.example.com")).unwrap();
    assert!(matches!(plan, Some(Plan::Crawl { import: true, .. })));
}

#[test]
fn environment_with_product_input_imports_those_products() {
    let config = AppConfig {
        shopify_product_input: Some(vec![
            "https://shop.example.com/products/blue-tee".to_string(),
            "red-tee".to_string(),
        ]),
        ..with_shop("https://shop.example.com")
    };
    assert_eq!(
        Plan::from_config(&config).unwrap(),
        Some(Plan::Targeted {
            shop_url: "https://shop.example.com".to_string(),
            handles: vec!["blue-tee".to_string(), "red-tee".to_string()],
        })
    );
}

#[test]
fn environment_with_product_input_but_no_handles_is_an_error() {
    let config = AppConfig {
        shopify_product_input: Some(Vec::new()),
        ..with_shop("https://shop.example.com")
    };
    let err = Plan::from_config(&config).unwrap_err();
    assert!(
        err.to_string().contains("SHOPIFY_PRODUCT_INPUT"),
        "got: {err}"
    );
}

#[test]
fn environment_with_only_slashes_as_product_input_is_an_error() {
    let config = AppConfig {
        shopify_product_input: Some(vec!["/".to_string()]),
        ..with_shop("https://shop.example.com")
    };
    assert!(Plan::from_config(&config).is_err());
}

#[test]
fn prompt_full_catalog() {
    let mut input = Cursor::new("1\nhttps://shop.example.com\n");
    let mut output = Vec::new();
    let plan = prompt::ask_plan(&mut input, &mut output, &config()).unwrap();

    assert!(matches!(
        plan,
        Plan::Crawl { ref shop_url, import: true, .. } if shop_url == "https://shop.example.com"
    ));
    assert!(String::from_utf8(output).unwrap().contains("full catalog"));
}

#[test]
fn prompt_reasks_until_answers_are_valid() {
    let mut input = Cursor::new("3\n2\n\nhttps://shop.example.com\n , \nblue-tee,red-tee\n");
    let mut output = Vec::new();
    let plan = prompt::ask_plan(&mut input, &mut output, &config()).unwrap();

    assert_eq!(
        plan,
        Plan::Targeted {
            shop_url: "https://shop.example.com".to_string(),
            handles: vec!["blue-tee".to_string(), "red-tee".to_string()],
        }
    );
    let transcript = String::from_utf8(output).unwrap();
    assert_eq!(transcript.matches("Choose 1 or 2").count(), 2);
}

#[test]
fn prompt_fails_when_input_ends() {
    let mut input = Cursor::new("2\n");
    let mut output = Vec::new();
    assert!(prompt::ask_plan(&mut input, &mut output, &config()).is_err());
}

#[test]
fn outcome_lines_name_the_product() {
    let created = Ok(UpsertOutcome::Created {
        product_id: 600,
        variations: VariationTally {
            submitted: 1,
            failed: 1,
        },
    });
    let updated = Ok(UpsertOutcome::Updated {
        product_id: 7,
        variations: VariationTally::default(),
    });
    let skipped = Ok(UpsertOutcome::Skipped { existing_id: 9 });
    let failed = Err(UpsertError::Map(MapError::NoVariants { product_id: 4 }));

    assert_eq!(
        outcome_line("Hoodie", &created),
        "created  Hoodie (id 600, 1/2 variations)"
    );
    assert_eq!(outcome_line("Tee", &updated), "updated  Tee (id 7)");
    assert_eq!(
        outcome_line("Tee", &skipped),
        "skipped  Tee (already exists as id 9)"
    );
    assert!(outcome_line("Ghost", &failed).starts_with("failed   Ghost: "));
}

#[test]
fn import_policy_takes_fractional_backoff() {
    let policy = import_policy(&config()).unwrap();
    assert!(policy.update_existing);
    assert_eq!(policy.image_upload_retries, 3);
    assert_eq!(policy.image_retry_backoff, Duration::from_millis(1500));
}

#[test]
fn woo_settings_carry_credentials_and_retry_policy() {
    let settings = woo_settings(&config());
    assert_eq!(settings.base_url, "https://store.example.com");
    assert_eq!(settings.consumer_key, "ck_test");
    assert_eq!(settings.max_retries, 3);
    assert_eq!(settings.backoff_base_ms, 1000);
    assert!(!settings.query_string_auth);
}
