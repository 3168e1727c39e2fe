use thiserror::Error;

/// Hard errors surfaced before a run starts.
///
/// Scrape-time failures (blocks, transport errors, malformed or missing
/// embedded state) are never errors: they are contained at their unit of
/// work and expressed as [`crate::FetchOutcome`] variants or absent values.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
