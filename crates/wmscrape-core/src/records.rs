//! Record types produced by the scrape pipeline.
//!
//! Every field is optional: the site omits, nulls, or renames fields freely
//! between page variants, and absence is always a normal value here. Records
//! are built once by their owning stage and never mutated afterwards.
//!
//! Serde rename attributes keep the JSON output keyed the way the site keys
//! the underlying payload (`manufacturerName`, `availabilityStatus`, ...),
//! so downstream consumers see familiar names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry from a search-results page, normalized from the first item
/// stack of the embedded search payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Display price string, e.g. `"$12.99"`.
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<u64>,
    pub availability: Option<String>,
    pub image: Option<String>,
    /// Absolute product-page URL, qualified against the site origin.
    pub url: Option<String>,
}

/// One product-detail record, normalized from a product page's embedded
/// payload.
///
/// `price_info`, `image_info`, and `reviews` are copied verbatim as JSON
/// subtrees: their internal shape varies by listing type and the merger
/// digs into them lazily via [`crate::fields`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    #[serde(rename = "manufacturerName")]
    pub manufacturer_name: Option<String>,
    #[serde(rename = "priceInfo")]
    pub price_info: Option<Value>,
    #[serde(rename = "imageInfo")]
    pub image_info: Option<Value>,
    #[serde(rename = "availabilityStatus")]
    pub availability: Option<String>,
    #[serde(rename = "averageRating")]
    pub rating: Option<f64>,
    #[serde(rename = "orderLimit")]
    pub order_limit: Option<u64>,
    #[serde(rename = "shortDescription")]
    pub short_description: Option<String>,
    /// Review summary node; read from a sibling of the product node in the
    /// embedded payload, not from the product node itself.
    pub reviews: Option<Value>,
    #[serde(rename = "productUrl")]
    pub url: Option<String>,
}

/// One merged output row per [`SearchItem`], with product-detail values
/// preferred over search-item values field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergedRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<u64>,
    pub availability: Option<String>,
    pub image: Option<String>,
    pub product_url: Option<String>,
}
