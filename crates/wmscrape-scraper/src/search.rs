//! Sequential search-results pagination and item normalization.

use std::collections::HashSet;

use serde_json::Value;

use wmscrape_core::fields::{count, number, price_string, text};
use wmscrape_core::tree::descend;
use wmscrape_core::SearchItem;

use crate::client::{qualify_url, Fetch, FetchOutcome, BASE_URL};
use crate::state::extract_state;

/// Hard ceiling on search pages per run, regardless of what was requested.
pub const MAX_SEARCH_PAGES: usize = 25;

/// URL keys tried in order when resolving an item's product-page link.
const PRODUCT_URL_KEYS: [&str; 3] = ["productPageUrl", "productUrl", "canonicalUrl"];

/// Scrapes up to `pages` search-result pages for `query`, strictly
/// sequentially, and returns the normalized items in page order together
/// with the deduplicated product-URL list (first-seen order).
///
/// A page that cannot be fetched or parsed contributes zero items and the
/// run continues; the operation itself never fails.
pub async fn scrape_search<F: Fetch>(
    fetcher: &F,
    query: &str,
    pages: usize,
) -> (Vec<SearchItem>, Vec<String>) {
    let total_pages = pages.min(MAX_SEARCH_PAGES);
    tracing::info!(query, total_pages, "starting search scrape");

    let mut all_items = Vec::new();
    let mut all_urls = Vec::new();

    // Search pages are fetched one at a time on purpose: pagination is the
    // most fingerprinted surface, and overlapping page requests for one
    // query is not a pattern a mobile browser produces.
    for page in 1..=total_pages {
        let (items, urls) = fetch_search_page(fetcher, query, page).await;
        all_items.extend(items);
        all_urls.extend(urls);
    }

    (all_items, dedup_preserving_order(all_urls))
}

/// Fetches and parses one search page; any failure yields an empty page.
async fn fetch_search_page<F: Fetch>(
    fetcher: &F,
    query: &str,
    page: usize,
) -> (Vec<SearchItem>, Vec<String>) {
    let url = format!("{BASE_URL}/search");
    let params = [("q", query.to_owned()), ("page", page.to_string())];

    let FetchOutcome::Success { body, .. } = fetcher.fetch(&url, &params).await else {
        tracing::error!(query, page, "failed to retrieve search page");
        return (Vec::new(), Vec::new());
    };

    let Some(state) = extract_state(&body) else {
        tracing::error!(query, page, "embedded state missing from search page");
        return (Vec::new(), Vec::new());
    };

    let items = parse_search_items(&state);
    let urls = items.iter().filter_map(|item| item.url.clone()).collect();
    tracing::info!(page, items = items.len(), "search page parsed");
    (items, urls)
}

/// Extracts and normalizes the items of the first item stack from a search
/// page's embedded state. Any absent level yields an empty list.
#[must_use]
pub fn parse_search_items(state: &Value) -> Vec<SearchItem> {
    let stacks = descend(
        state,
        &["props", "pageProps", "initialData", "searchResult", "itemStacks"],
    );
    // Only the first stack carries organic results; later stacks are ad and
    // recommendation modules.
    let Some(items) = stacks
        .and_then(Value::as_array)
        .and_then(|stacks| stacks.first())
        .and_then(|stack| stack.get("items"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    items.iter().map(normalize_search_item).collect()
}

fn normalize_search_item(item: &Value) -> SearchItem {
    let id = item
        .get("usItemId")
        .and_then(text)
        .or_else(|| item.get("productId").and_then(text));

    SearchItem {
        url: build_product_url(item, id.as_deref()),
        id,
        name: item
            .get("title")
            .and_then(text)
            .or_else(|| item.get("name").and_then(text)),
        price: item
            .get("priceInfo")
            .and_then(price_string)
            .or_else(|| item.get("price").and_then(text)),
        rating: item
            .get("averageRating")
            .and_then(number)
            .or_else(|| item.get("rating").and_then(number)),
        reviews: item
            .get("numberOfReviews")
            .and_then(count)
            .or_else(|| item.get("reviewsCount").and_then(count)),
        availability: item.get("availabilityStatus").and_then(text),
        image: item
            .get("imageUrl")
            .and_then(text)
            .or_else(|| descend(item, &["imageInfo", "thumbnailUrl"]).and_then(text)),
    }
}

/// Resolves an item's product-page URL: first non-empty candidate key,
/// qualified against the site origin, else a canonical `/ip/{id}` path
/// synthesized from the identifier.
fn build_product_url(item: &Value, id: Option<&str>) -> Option<String> {
    for key in PRODUCT_URL_KEYS {
        if let Some(url) = item.get(key).and_then(Value::as_str) {
            if !url.is_empty() {
                return Some(qualify_url(url));
            }
        }
    }
    id.map(|id| format!("{BASE_URL}/ip/{id}"))
}

/// Stable dedup: keeps the first occurrence of each URL, preserving order.
fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
