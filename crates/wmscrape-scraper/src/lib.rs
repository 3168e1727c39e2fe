pub mod block;
pub mod client;
pub mod error;
pub mod product;
pub mod search;
pub mod state;

pub use block::is_blocked;
pub use client::{Fetch, FetchOutcome, WalmartClient, BASE_URL, MOBILE_USER_AGENTS};
pub use error::ScrapeError;
pub use product::scrape_products;
pub use search::scrape_search;
pub use state::extract_state;
