//! Bounded-concurrency product-detail fetching and normalization.

use futures::stream::{self, StreamExt};
use serde_json::Value;

use wmscrape_core::fields::{count, number, text};
use wmscrape_core::tree::descend;
use wmscrape_core::ProductRecord;

use crate::client::{qualify_url, Fetch, FetchOutcome};
use crate::state::extract_state;

/// Fetches every product URL with at most `concurrency` requests in flight
/// and returns the records that fetched and parsed successfully, in
/// completion order.
///
/// All URLs are submitted up front and throttled by the stream's
/// admission gate; a URL whose fetch or parse fails is logged and skipped,
/// releasing its slot exactly like a success. The call returns only after
/// every submitted URL has resolved.
pub async fn scrape_products<F: Fetch>(
    fetcher: &F,
    urls: &[String],
    concurrency: usize,
) -> Vec<ProductRecord> {
    tracing::info!(urls = urls.len(), concurrency, "starting product scrape");

    stream::iter(urls)
        .map(|url| fetch_product(fetcher, url))
        .buffer_unordered(concurrency.max(1))
        .filter_map(std::future::ready)
        .collect()
        .await
}

/// Fetches and parses one product page; any failure is contained here.
async fn fetch_product<F: Fetch>(fetcher: &F, url: &str) -> Option<ProductRecord> {
    let FetchOutcome::Success { body, .. } = fetcher.fetch(url, &[]).await else {
        tracing::error!(url, "failed to fetch product page");
        return None;
    };

    let Some(state) = extract_state(&body) else {
        tracing::error!(url, "embedded state missing from product page");
        return None;
    };

    let Some(record) = parse_product(&state, url) else {
        tracing::warn!(url, "product node missing from embedded state");
        return None;
    };

    tracing::info!(url, id = record.id.as_deref(), "fetched product");
    Some(record)
}

/// Normalizes the product node of a product page's embedded state.
///
/// Copies the structured subtrees (`priceInfo`, `imageInfo`) verbatim; the
/// `reviews` node lives beside the product node in the same initial-data
/// object, not inside it. The canonical URL falls back to the originally
/// requested `url` when the page supplies none.
#[must_use]
pub fn parse_product(state: &Value, url: &str) -> Option<ProductRecord> {
    let initial_data = descend(state, &["props", "pageProps", "initialData", "data"])?;
    let product = initial_data.get("product").filter(|node| node.is_object())?;

    Some(ProductRecord {
        id: product
            .get("id")
            .and_then(text)
            .or_else(|| product.get("usItemId").and_then(text)),
        name: product.get("name").and_then(text),
        brand: product.get("brand").and_then(text),
        manufacturer_name: product.get("manufacturerName").and_then(text),
        price_info: subtree(product, "priceInfo"),
        image_info: subtree(product, "imageInfo"),
        availability: product.get("availabilityStatus").and_then(text),
        rating: product.get("averageRating").and_then(number),
        order_limit: product.get("orderLimit").and_then(count),
        short_description: product.get("shortDescription").and_then(text),
        reviews: subtree(initial_data, "reviews"),
        url: Some(
            product
                .get("canonicalUrl")
                .and_then(Value::as_str)
                .map_or_else(|| url.to_owned(), qualify_url),
        ),
    })
}

/// Copies a JSON subtree verbatim, treating explicit `null` as absent.
fn subtree(node: &Value, key: &str) -> Option<Value> {
    node.get(key).filter(|value| !value.is_null()).cloned()
}

#[cfg(test)]
#[path = "product_test.rs"]
mod tests;
