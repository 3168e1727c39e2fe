//! Field extraction helpers shared by the scrapers and the merger.
//!
//! The embedded payload is loosely typed: prices show up as display strings
//! or bare numbers, counts as integers or numeric strings, and the same
//! logical field moves between nested structures depending on the listing.
//! These helpers coerce each shape to one canonical value and treat empty
//! strings as absent, so callers can chain fallbacks with `or_else`.

use serde_json::Value;

use crate::tree::descend;

/// Coerces a JSON value to a non-empty display string.
///
/// Strings pass through (empty ones become `None`); numbers are rendered
/// with their JSON representation. Everything else is absent.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerces a JSON value to `f64`: a number, or a numeric string.
pub fn number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// Coerces a JSON value to `u64`: a non-negative integer, or a numeric string.
pub fn count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// Extracts a display price from a `priceInfo` subtree:
/// `currentPrice.priceString`, falling back to `currentPrice.price`.
pub fn price_string(price_info: &Value) -> Option<String> {
    let current = descend(price_info, &["currentPrice"])?;
    current
        .get("priceString")
        .and_then(text)
        .or_else(|| current.get("price").and_then(text))
}

/// Extracts an image URL from an `imageInfo` subtree: `thumbnailUrl`,
/// falling back to the first entry of `allImages`.
pub fn image_url(image_info: &Value) -> Option<String> {
    image_info.get("thumbnailUrl").and_then(text).or_else(|| {
        image_info
            .get("allImages")
            .and_then(Value::as_array)
            .and_then(|images| images.first())
            .and_then(|image| image.get("url"))
            .and_then(text)
    })
}

/// Extracts a total review count from a `reviews` subtree:
/// `reviewsCount`, falling back to `totalReviewCount`.
pub fn reviews_count(reviews: &Value) -> Option<u64> {
    reviews
        .get("reviewsCount")
        .and_then(count)
        .or_else(|| reviews.get("totalReviewCount").and_then(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_passes_strings_and_renders_numbers() {
        assert_eq!(text(&json!("$4.98")), Some("$4.98".to_owned()));
        assert_eq!(text(&json!(4.98)), Some("4.98".to_owned()));
    }

    #[test]
    fn text_treats_empty_string_as_absent() {
        assert_eq!(text(&json!("")), None);
        assert_eq!(text(&json!(null)), None);
    }

    #[test]
    fn number_accepts_numeric_strings() {
        assert_eq!(number(&json!("4.6")), Some(4.6));
        assert_eq!(number(&json!(4.6)), Some(4.6));
        assert_eq!(number(&json!("n/a")), None);
    }

    #[test]
    fn price_string_prefers_price_string_over_price() {
        let info = json!({"currentPrice": {"priceString": "$12.99", "price": 12.99}});
        assert_eq!(price_string(&info), Some("$12.99".to_owned()));

        let info = json!({"currentPrice": {"price": 12.99}});
        assert_eq!(price_string(&info), Some("12.99".to_owned()));
    }

    #[test]
    fn price_string_on_non_object_current_price_is_absent() {
        assert_eq!(price_string(&json!({"currentPrice": "$5"})), None);
        assert_eq!(price_string(&json!({})), None);
    }

    #[test]
    fn image_url_falls_back_to_first_gallery_image() {
        let info = json!({"allImages": [{"url": "https://i.example/1.jpg"}]});
        assert_eq!(image_url(&info), Some("https://i.example/1.jpg".to_owned()));
    }

    #[test]
    fn reviews_count_falls_back_to_total_review_count() {
        assert_eq!(reviews_count(&json!({"reviewsCount": 12})), Some(12));
        assert_eq!(reviews_count(&json!({"totalReviewCount": 7})), Some(7));
        assert_eq!(reviews_count(&json!({})), None);
    }
}
