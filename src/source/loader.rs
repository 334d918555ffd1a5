//! Loading record sets from local JSON files.
//!
//! File input mirrors what the HTTP endpoints return: a JSON array of
//! loosely-typed records. The date-range filter is applied here so
//! local-file runs behave like server-side filtered fetches.

use crate::analysis::lifecycle::parse_fecha;
use crate::models::ContractRecord;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

/// Reads a JSON array of raw records from a file.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let records: Vec<T> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON array: {}", path.display()))?;

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Keeps records whose signing date falls inside `[desde, hasta]`.
///
/// Records without a parseable signing date are kept: the range filter
/// narrows, it never invents a reason to drop data the endpoints would
/// have returned.
pub fn filter_by_range(
    records: Vec<ContractRecord>,
    desde: NaiveDate,
    hasta: NaiveDate,
) -> Vec<ContractRecord> {
    let before = records.len();
    let filtered: Vec<ContractRecord> = records
        .into_iter()
        .filter(|r| match parse_fecha(r.fecha_firma.as_deref()) {
            Some(firma) => firma >= desde && firma <= hasta,
            None => true,
        })
        .collect();

    debug!(
        kept = filtered.len(),
        dropped = before - filtered.len(),
        "applied date-range filter"
    );
    filtered
}
