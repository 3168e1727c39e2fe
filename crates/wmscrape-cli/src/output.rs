//! On-disk serialization of scrape results: pretty JSON plus a merged CSV.

use std::fs;
use std::path::Path;

use serde::Serialize;

use wmscrape_core::MergedRow;

/// Writes `data` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), "saved JSON");
    Ok(())
}

/// Writes the merged rows to `path` as CSV with a header row.
///
/// # Errors
///
/// Returns an error if rendering or the file write fails.
pub fn write_csv(path: &Path, rows: &[MergedRow]) -> anyhow::Result<()> {
    fs::write(path, render_csv(rows)?)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "saved CSV");
    Ok(())
}

/// Renders the merged rows as CSV bytes. The header comes from the
/// `MergedRow` field names via serde.
fn render_csv(rows: &[MergedRow]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(writer.into_inner()?)
}
