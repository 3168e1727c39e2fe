//! Heuristic detection of anti-automation blocks.
//!
//! The detector is deliberately block-recall-heavy: an OR over several weak
//! signals, accepting some false positives because a retry is cheap relative
//! to silently missing data.

/// Status code the site returns when it has identified and rejected an
/// automated client.
pub const BLOCKED_STATUS: u16 = 456;

/// Phrases that only appear on the site's bot-challenge interstitials.
const BLOCK_PHRASES: [&str; 2] = ["robot or human", "blocked"];

/// Marker carried by every legitimately rendered page: the id of the inline
/// script element holding the embedded rendering state. Compared lowercased.
const STATE_MARKER: &str = "__next_data__";

/// Returns `true` if the response looks like an anti-automation block.
///
/// A response is blocked when any of the following hold:
/// 1. the status is [`BLOCKED_STATUS`];
/// 2. the body contains a known challenge phrase (case-insensitive);
/// 3. the body lacks the embedded-state marker — legitimate pages always
///    carry their rendering payload, so its absence is itself evidence.
#[must_use]
pub fn is_blocked(status: u16, body: &str) -> bool {
    if status == BLOCKED_STATUS {
        return true;
    }
    let lowered = body.to_ascii_lowercase();
    BLOCK_PHRASES.iter().any(|phrase| lowered.contains(phrase))
        || !lowered.contains(STATE_MARKER)
}
