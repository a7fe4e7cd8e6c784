//! Integration tests for `ShopifyClient` against a local storefront.
//!
//! Every test stands up a `wiremock` server so no real network traffic is
//! made. Covers the page fetch, the batch crawl, and the by-handle lookup.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopwoo_scraper::{BatchStore, CrawlOptions, ScraperError, ShopifyClient};

/// Builds a `ShopifyClient` suitable for tests: 5-second timeout, no retries.
fn test_client() -> ShopifyClient {
    ShopifyClient::new(5, "shopwoo-test/0.1", 0, 0).expect("failed to build test ShopifyClient")
}

fn test_client_with_retries(max_retries: u32) -> ShopifyClient {
    ShopifyClient::new(5, "shopwoo-test/0.1", max_retries, 0)
        .expect("failed to build test ShopifyClient")
}

fn scratch_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("shopwoo-it-{tag}-{}-{nanos}", std::process::id()))
}

fn product(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Product {id}"),
        "handle": format!("product-{id}"),
        "vendor": "Acme",
        "tags": ["a", "b"],
        "variants": [{"id": id * 100, "price": "12.99", "sku": null}]
    })
}

fn page_of(ids: &[i64]) -> serde_json::Value {
    json!({ "products": ids.iter().map(|id| product(*id)).collect::<Vec<_>>() })
}

async fn mount_page(server: &MockServer, page: u32, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// fetch_products_page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_products_page_sends_limit_and_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("limit", "25"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_of(&[7])))
        .expect(1)
        .mount(&server)
        .await;

    let products = test_client()
        .fetch_products_page(&server.uri(), 25, 3)
        .await
        .expect("page fetch should succeed");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], 7);
}

#[tokio::test]
async fn fetch_products_page_treats_missing_products_as_empty() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({})).await;

    let products = test_client()
        .fetch_products_page(&server.uri(), 250, 1)
        .await
        .unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn fetch_products_page_rejects_malformed_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_products_page(&server.uri(), 250, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn fetch_products_page_reports_rate_limit_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    match test_client()
        .fetch_products_page(&server.uri(), 250, 1)
        .await
        .unwrap_err()
    {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => assert_eq!(retry_after_secs, 30),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_products_page_retries_server_error_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, 1, page_of(&[42])).await;

    let products = test_client_with_retries(1)
        .fetch_products_page(&server.uri(), 250, 1)
        .await
        .expect("retry should recover from a single 503");
    assert_eq!(products[0]["id"], 42);
}

// ---------------------------------------------------------------------------
// crawl_to_batches
// ---------------------------------------------------------------------------

#[tokio::test]
async fn crawl_writes_one_batch_per_page_until_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_of(&[1, 2])).await;
    mount_page(&server, 2, page_of(&[3])).await;
    mount_page(&server, 3, json!({"products": []})).await;

    let dir = scratch_dir("crawl");
    let store = BatchStore::new(&dir);
    let summary = test_client()
        .crawl_to_batches(&server.uri(), &CrawlOptions::default(), &store)
        .await
        .expect("crawl should succeed");

    assert_eq!(summary.products, 3);
    assert_eq!(summary.files, vec![store.path_for(1), store.path_for(2)]);
    assert!(!summary.hit_page_limit);
    assert!(summary.stopped_by.is_none());

    let first = BatchStore::load(&store.path_for(1)).await.unwrap();
    assert_eq!(first, vec![product(1), product(2)]);
    assert_eq!(store.list().await.unwrap().len(), 2);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn crawl_stops_at_page_ceiling() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_of(&[1])))
        .expect(2)
        .mount(&server)
        .await;

    let dir = scratch_dir("ceiling");
    let store = BatchStore::new(&dir);
    let options = CrawlOptions {
        max_pages: 2,
        ..CrawlOptions::default()
    };
    let summary = test_client()
        .crawl_to_batches(&server.uri(), &options, &store)
        .await
        .unwrap();

    assert!(summary.hit_page_limit);
    assert_eq!(summary.files.len(), 2);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn crawl_keeps_saved_pages_when_a_later_page_fails() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_of(&[1])).await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = scratch_dir("partial");
    let store = BatchStore::new(&dir);
    let summary = test_client()
        .crawl_to_batches(&server.uri(), &CrawlOptions::default(), &store)
        .await
        .expect("a later-page failure should not fail the crawl");

    assert_eq!(summary.files, vec![store.path_for(1)]);
    let reason = summary.stopped_by.expect("stop reason should be recorded");
    assert!(reason.contains("500"), "reason: {reason}");

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn crawl_fails_when_first_page_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = scratch_dir("first-fail");
    let store = BatchStore::new(&dir);
    let err = test_client()
        .crawl_to_batches(&server.uri(), &CrawlOptions::default(), &store)
        .await
        .unwrap_err();

    assert!(matches!(err, ScraperError::NotFound { .. }), "got {err:?}");
    assert!(store.list().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// fetch_product_by_handle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_by_handle_reads_product_member() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/product-5.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"product": product(5)})))
        .mount(&server)
        .await;

    let record = test_client()
        .fetch_product_by_handle(&server.uri(), "product-5")
        .await
        .unwrap();
    assert_eq!(record, product(5));
}

#[tokio::test]
async fn fetch_by_handle_falls_back_to_first_of_products() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/product-8.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_of(&[8, 9])))
        .mount(&server)
        .await;

    let record = test_client()
        .fetch_product_by_handle(&format!("{}/collections/all", server.uri()), "product-8")
        .await
        .unwrap();
    assert_eq!(record["id"], 8);
}

#[tokio::test]
async fn fetch_by_handle_without_product_is_missing_product() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/ghost.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"products": []})))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_product_by_handle(&server.uri(), "ghost")
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::MissingProduct { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn fetch_by_handle_unknown_handle_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/nope.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_product_by_handle(&server.uri(), "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::NotFound { .. }), "got {err:?}");
}
