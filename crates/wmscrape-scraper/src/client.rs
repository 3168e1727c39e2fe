//! Retrying HTTP fetcher with mobile-browser shaping and block evasion.
//!
//! Every request goes out looking like a mobile Safari page load: a fixed
//! base header set plus a user-agent rotated round-robin across attempts.
//! Retries sleep for a uniformly jittered delay so the attempt cadence
//! carries no fixed-interval fingerprint.

use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;

use crate::block::is_blocked;
use crate::error::ScrapeError;

/// Origin used to qualify relative product URLs and build search URLs.
pub const BASE_URL: &str = "https://www.walmart.com";

/// Fixed mobile user-agent pool, cycled round-robin per attempt:
/// attempt n (1-based) uses entry `(n - 1) % 3`. Never randomized, so the
/// sequence of attempts is deterministic and testable.
pub const MOBILE_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.2 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 15_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.6 Mobile/15E148 Safari/604.1",
];

/// Base header set sent with every request, mirroring a mobile browser's
/// top-level document navigation. The user-agent is added per attempt.
const DEFAULT_HEADERS: [(&str, &str); 7] = [
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.9"),
    ("upgrade-insecure-requests", "1"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
];

/// Result of a fetch.
///
/// `Blocked` and `TransportError` describe a single attempt and never
/// escape [`Fetch::fetch`]; the public outcome of a call is either
/// `Success` (first non-blocked response) or `Exhausted` (every attempt
/// failed). `Exhausted` is a soft signal — callers handle it as "no data
/// available for this request", never as a run-aborting error.
#[derive(Debug)]
pub enum FetchOutcome {
    Success { status: u16, body: String },
    Blocked,
    TransportError,
    Exhausted,
}

/// Seam between the scrapers and the network.
///
/// [`WalmartClient`] is the production implementation; tests substitute
/// instrumented doubles to observe attempt counts and in-flight bounds
/// without real network traffic.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Issues a GET for `url` with `params` as the query string,
    /// retrying per the implementation's policy.
    async fn fetch(&self, url: &str, params: &[(&str, String)]) -> FetchOutcome;
}

/// HTTP client for the target site.
///
/// Holds one connection-pooled [`reqwest::Client`] shared by every caller
/// of a run; the only per-call state is the deterministic UA index
/// arithmetic, so concurrent fetches are safe.
pub struct WalmartClient {
    client: Client,
    /// Total attempts per fetch, counting the first.
    max_attempts: usize,
    /// Jitter window (inclusive, milliseconds) slept before retry attempts.
    jitter_min_ms: u64,
    jitter_max_ms: u64,
}

impl WalmartClient {
    /// Creates a client with the given per-request timeout, attempt budget,
    /// and retry-jitter window.
    ///
    /// Redirects are followed automatically (reqwest's default policy) and
    /// HTTP/2 is preferred via ALPN. Production callers want
    /// `new(30, 3, 1500, 4500)`; tests pass a zero jitter window so retries
    /// do not sleep.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        max_attempts: usize,
        jitter_min_ms: u64,
        jitter_max_ms: u64,
    ) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        for (name, value) in DEFAULT_HEADERS {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_attempts: max_attempts.max(1),
            jitter_min_ms,
            jitter_max_ms,
        })
    }

    /// Issues one GET with the given user-agent and classifies the result.
    async fn fetch_once(&self, url: &str, params: &[(&str, String)], user_agent: &str) -> FetchOutcome {
        let response = match self
            .client
            .get(url)
            .query(params)
            .header(USER_AGENT, user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(url, %error, "transport error during request");
                return FetchOutcome::TransportError;
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(url, status, %error, "failed to read response body");
                return FetchOutcome::TransportError;
            }
        };

        if is_blocked(status, &body) {
            tracing::warn!(
                url,
                status,
                body_len = body.len(),
                "potential block detected"
            );
            return FetchOutcome::Blocked;
        }

        FetchOutcome::Success { status, body }
    }

    /// Uniform jittered delay for retry attempts.
    fn jitter_delay(&self) -> Duration {
        let millis = if self.jitter_max_ms > self.jitter_min_ms {
            rand::rng().random_range(self.jitter_min_ms..=self.jitter_max_ms)
        } else {
            self.jitter_min_ms
        };
        Duration::from_millis(millis)
    }
}

impl Fetch for WalmartClient {
    /// Fetches `url`, retrying on transport failure and detected blocks.
    ///
    /// The first non-blocked response wins; remaining attempts are never
    /// spent. When every attempt fails, returns [`FetchOutcome::Exhausted`].
    async fn fetch(&self, url: &str, params: &[(&str, String)]) -> FetchOutcome {
        for attempt in 1..=self.max_attempts {
            let user_agent = MOBILE_USER_AGENTS[(attempt - 1) % MOBILE_USER_AGENTS.len()];

            if attempt > 1 {
                let delay = self.jitter_delay();
                tracing::info!(
                    url,
                    attempt,
                    max_attempts = self.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    user_agent,
                    "retrying after jittered delay"
                );
                tokio::time::sleep(delay).await;
            }

            match self.fetch_once(url, params, user_agent).await {
                FetchOutcome::Success { status, body } => {
                    return FetchOutcome::Success { status, body };
                }
                // Both per-attempt failures are already logged in fetch_once.
                FetchOutcome::Blocked | FetchOutcome::TransportError | FetchOutcome::Exhausted => {}
            }
        }

        tracing::error!(
            url,
            attempts = self.max_attempts,
            "giving up after exhausting all attempts"
        );
        FetchOutcome::Exhausted
    }
}

/// Qualifies a possibly-relative URL against the site origin.
pub(crate) fn qualify_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_owned()
    } else {
        format!("{BASE_URL}{url}")
    }
}
