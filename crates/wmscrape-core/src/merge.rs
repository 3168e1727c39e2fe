//! Reconciliation of product-detail records with search items.

use std::collections::HashMap;

use crate::fields;
use crate::records::{MergedRow, ProductRecord, SearchItem};

/// Merges product-detail records into the search-item list, producing one
/// row per search item in search-item order.
///
/// Products are keyed by identifier; when two products carry the same id,
/// the last one encountered wins (URLs are deduped upstream, so duplicates
/// only arise when the site serves one id under two URLs). Search items
/// without a matching product still produce a row, with product-only
/// fields left absent.
#[must_use]
pub fn merge(products: &[ProductRecord], search_items: &[SearchItem]) -> Vec<MergedRow> {
    let mut by_id: HashMap<&str, &ProductRecord> = HashMap::new();
    for product in products {
        if let Some(id) = product.id.as_deref() {
            by_id.insert(id, product);
        }
    }

    search_items
        .iter()
        .map(|item| {
            let product = item.id.as_deref().and_then(|id| by_id.get(id).copied());
            merge_row(product, item)
        })
        .collect()
}

/// Builds one output row, preferring the product's value for every field
/// and falling back to the search item's when the product value is absent
/// or no product matched.
fn merge_row(product: Option<&ProductRecord>, item: &SearchItem) -> MergedRow {
    MergedRow {
        id: item
            .id
            .clone()
            .or_else(|| product.and_then(|p| p.id.clone())),
        name: product
            .and_then(|p| p.name.clone())
            .or_else(|| item.name.clone()),
        price: product
            .and_then(|p| p.price_info.as_ref())
            .and_then(fields::price_string)
            .or_else(|| item.price.clone()),
        rating: product.and_then(|p| p.rating).or(item.rating),
        reviews_count: product
            .and_then(|p| p.reviews.as_ref())
            .and_then(fields::reviews_count)
            .or(item.reviews),
        availability: product
            .and_then(|p| p.availability.clone())
            .or_else(|| item.availability.clone()),
        image: product
            .and_then(|p| p.image_info.as_ref())
            .and_then(fields::image_url)
            .or_else(|| item.image.clone()),
        product_url: product
            .and_then(|p| p.url.clone())
            .or_else(|| item.url.clone()),
    }
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
