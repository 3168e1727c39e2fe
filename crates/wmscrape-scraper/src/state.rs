//! Recovery of the embedded rendering-state payload from page HTML.

use scraper::{Html, Selector};
use serde_json::Value;

/// CSS selector for the inline script element carrying the page's
/// rendering state as JSON.
const STATE_SELECTOR: &str = "script#__NEXT_DATA__";

/// Extracts and parses the embedded state payload from raw page HTML.
///
/// Returns `None` when the script element is missing, and logs a warning
/// and returns `None` when its content is not valid JSON. Absence is a
/// normal value here; callers treat it as "no data on this page".
#[must_use]
pub fn extract_state(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(STATE_SELECTOR).ok()?;
    let element = document.select(&selector).next()?;
    let raw = element.text().collect::<String>();

    match serde_json::from_str(&raw) {
        Ok(state) => Some(state),
        Err(error) => {
            tracing::warn!(%error, "embedded state payload is not valid JSON");
            None
        }
    }
}
