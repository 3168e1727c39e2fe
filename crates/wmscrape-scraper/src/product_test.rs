use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{json, Value};

use super::*;

fn product_state(id: &str) -> Value {
    json!({
        "props": {"pageProps": {"initialData": {"data": {
            "product": {"usItemId": id, "name": format!("Product {id}")},
            "reviews": {"reviewsCount": 3},
        }}}}
    })
}

fn product_page_body(id: &str) -> String {
    format!(
        r#"<html><body><script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#,
        product_state(id)
    )
}

/// Instrumented fetch double: tracks the number of fetches in flight and
/// the maximum ever observed, holding each fetch open briefly so overlap
/// is measurable. URLs in `exhausted` resolve to `FetchOutcome::Exhausted`.
struct GaugedFetcher {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    exhausted: HashSet<String>,
}

impl GaugedFetcher {
    fn new(exhausted: HashSet<String>) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            exhausted,
        }
    }
}

impl Fetch for GaugedFetcher {
    async fn fetch(&self, url: &str, _params: &[(&str, String)]) -> FetchOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.exhausted.contains(url) {
            return FetchOutcome::Exhausted;
        }
        let id = url.rsplit('/').next().unwrap_or("0");
        FetchOutcome::Success {
            status: 200,
            body: product_page_body(id),
        }
    }
}

fn urls(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("https://www.walmart.com/ip/{i}")).collect()
}

#[tokio::test]
async fn at_most_concurrency_fetches_are_in_flight() {
    let fetcher = GaugedFetcher::new(HashSet::new());

    let records = scrape_products(&fetcher, &urls(10), 3).await;

    assert_eq!(records.len(), 10);
    assert_eq!(
        fetcher.max_in_flight.load(Ordering::SeqCst),
        3,
        "admission gate should saturate at the bound and never exceed it"
    );
    assert_eq!(fetcher.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_urls_are_skipped_and_release_their_slots() {
    let exhausted: HashSet<String> = [2, 5, 8]
        .iter()
        .map(|i| format!("https://www.walmart.com/ip/{i}"))
        .collect();
    let fetcher = GaugedFetcher::new(exhausted);

    let records = scrape_products(&fetcher, &urls(10), 3).await;

    assert_eq!(records.len(), 7, "exactly the successful subset is returned");
    assert!(fetcher.max_in_flight.load(Ordering::SeqCst) <= 3);
    let ids: HashSet<&str> = records.iter().filter_map(|r| r.id.as_deref()).collect();
    assert!(!ids.contains("2") && !ids.contains("5") && !ids.contains("8"));
}

#[tokio::test]
async fn page_without_product_node_is_skipped() {
    struct EmptyPage;
    impl Fetch for EmptyPage {
        async fn fetch(&self, _url: &str, _params: &[(&str, String)]) -> FetchOutcome {
            let state = json!({"props": {"pageProps": {"initialData": {"data": {}}}}});
            FetchOutcome::Success {
                status: 200,
                body: format!(
                    r#"<html><script id="__NEXT_DATA__" type="application/json">{state}</script></html>"#
                ),
            }
        }
    }

    let records = scrape_products(&EmptyPage, &urls(3), 2).await;

    assert!(records.is_empty());
}

#[test]
fn parse_product_copies_the_field_allow_list() {
    let state = json!({
        "props": {"pageProps": {"initialData": {"data": {
            "product": {
                "id": "prod-1",
                "name": "Widget",
                "brand": "Acme",
                "manufacturerName": "Acme Corp",
                "priceInfo": {"currentPrice": {"priceString": "$5.00"}},
                "imageInfo": {"thumbnailUrl": "https://i.example/w.jpg"},
                "availabilityStatus": "IN_STOCK",
                "averageRating": 4.5,
                "orderLimit": 12,
                "shortDescription": "A widget.",
                "canonicalUrl": "/ip/prod-1",
            },
            "reviews": {"totalReviewCount": 42},
        }}}}
    });

    let record = parse_product(&state, "https://www.walmart.com/ip/requested")
        .expect("product node should parse");

    assert_eq!(record.id.as_deref(), Some("prod-1"));
    assert_eq!(record.name.as_deref(), Some("Widget"));
    assert_eq!(record.brand.as_deref(), Some("Acme"));
    assert_eq!(record.manufacturer_name.as_deref(), Some("Acme Corp"));
    assert_eq!(record.availability.as_deref(), Some("IN_STOCK"));
    assert_eq!(record.rating, Some(4.5));
    assert_eq!(record.order_limit, Some(12));
    assert_eq!(record.short_description.as_deref(), Some("A widget."));
    assert_eq!(
        record.reviews,
        Some(json!({"totalReviewCount": 42})),
        "reviews come from the sibling node, not the product node"
    );
    assert_eq!(
        record.url.as_deref(),
        Some("https://www.walmart.com/ip/prod-1"),
        "relative canonical URL is qualified against the origin"
    );
}

#[test]
fn parse_product_identifier_falls_back_to_us_item_id() {
    let record = parse_product(&product_state("999"), "https://www.walmart.com/ip/999")
        .expect("product node should parse");
    assert_eq!(record.id.as_deref(), Some("999"));
}

#[test]
fn parse_product_defaults_url_to_the_requested_one() {
    let record = parse_product(&product_state("1"), "https://www.walmart.com/ip/1?athbdg=L1600")
        .expect("product node should parse");
    assert_eq!(
        record.url.as_deref(),
        Some("https://www.walmart.com/ip/1?athbdg=L1600")
    );
}

#[test]
fn parse_product_absent_or_null_product_node_is_none() {
    let missing = json!({"props": {"pageProps": {"initialData": {"data": {}}}}});
    assert!(parse_product(&missing, "u").is_none());

    let null = json!({"props": {"pageProps": {"initialData": {"data": {"product": null}}}}});
    assert!(parse_product(&null, "u").is_none());
}
