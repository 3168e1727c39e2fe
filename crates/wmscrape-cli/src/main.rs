use std::path::PathBuf;

use clap::Parser;

use wmscrape_core::merge;
use wmscrape_scraper::{scrape_products, scrape_search, WalmartClient};

mod output;

/// Per-request timeout; bounds individual fetches, not the run.
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Attempts per fetch, counting the first.
const MAX_ATTEMPTS: usize = 3;
/// Jitter window slept before retry attempts, in milliseconds.
const RETRY_JITTER_MS: (u64, u64) = (1500, 4500);

#[derive(Debug, Parser)]
#[command(name = "wmscrape")]
#[command(about = "Walmart search and product-detail scraper")]
struct Cli {
    /// Search query to scrape.
    #[arg(long)]
    query: String,

    /// Number of search result pages to scrape (capped at 25).
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Maximum number of product-detail fetches in flight.
    #[arg(long, default_value_t = 5)]
    concurrency: usize,

    /// Directory the JSON and CSV files are written to.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.output_dir)?;

    // One pooled client for the whole run; dropped on every exit path.
    let client = WalmartClient::new(
        REQUEST_TIMEOUT_SECS,
        MAX_ATTEMPTS,
        RETRY_JITTER_MS.0,
        RETRY_JITTER_MS.1,
    )?;

    let (search_items, product_urls) = scrape_search(&client, &cli.query, cli.pages).await;
    output::write_json(&cli.output_dir.join("search.json"), &search_items)?;

    let products = scrape_products(&client, &product_urls, cli.concurrency).await;
    output::write_json(&cli.output_dir.join("products.json"), &products)?;

    let rows = merge(&products, &search_items);
    output::write_csv(&cli.output_dir.join("products.csv"), &rows)?;

    tracing::info!(
        items = search_items.len(),
        products = products.len(),
        rows = rows.len(),
        "run complete"
    );
    Ok(())
}
