//! CSV ingest and normalization.
//!
//! This module is responsible for turning a point-of-sale CSV export into a
//! clean, typed set of `SalesRecord`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors naming the column)
//! - **Fail fast** on the first bad value: totals must be complete, so rows are
//!   never skipped
//! - **Deterministic behavior** (row order preserved, no hidden defaults)
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{AMOUNT_COLUMNS, DATE_COLUMN, RawSalesRow, SalesRecord};
use crate::error::PipelineError;

/// Named header spellings accepted for the date-fragment column (lowercased),
/// in order of preference.
///
/// Spreadsheet exports often leave the first header blank; pandas then reports
/// it as `Unnamed: 0`. A blank header is only taken as the date column when it
/// is the first column, since a trailing comma also produces a blank header.
const DATE_HEADER_ALIASES: [&str; 2] = ["date", "unnamed: 0"];

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    date: usize,
    amounts: [usize; 6],
}

/// Read and clean a sales export in one step.
pub fn load_sales_records(path: &Path, reference_year: i32) -> Result<Vec<SalesRecord>, PipelineError> {
    let rows = read_raw_rows(path)?;
    let records = clean(&rows, reference_year)?;
    info!(path = %path.display(), rows = records.len(), "sales data loaded and cleaned");
    Ok(records)
}

/// Read raw rows from a CSV file, validating the header schema.
pub fn read_raw_rows(path: &Path) -> Result<Vec<RawSalesRow>, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    read_raw_rows_from(file)
}

/// Read raw rows from any reader (file, upload buffer, test string).
pub fn read_raw_rows_from<R: Read>(reader: R) -> Result<Vec<RawSalesRow>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);
    let columns = resolve_columns(&header_map)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header and lines are 1-based.
        let line = idx + 2;
        let record = result?;
        rows.push(raw_row(&record, &columns, line));
    }

    debug!(rows = rows.len(), "read raw sales rows");
    Ok(rows)
}

/// Normalize raw rows into typed records.
///
/// Output order matches input order. An empty input is not an error.
pub fn clean(rows: &[RawSalesRow], reference_year: i32) -> Result<Vec<SalesRecord>, PipelineError> {
    rows.iter().map(|row| clean_row(row, reference_year)).collect()
}

fn clean_row(row: &RawSalesRow, reference_year: i32) -> Result<SalesRecord, PipelineError> {
    let mut amounts = [0.0; 6];
    for (slot, (column, raw)) in amounts.iter_mut().zip(row.amount_fields()) {
        *slot = parse_amount(raw).ok_or_else(|| PipelineError::DataFormat {
            column: column.to_string(),
            value: raw.to_string(),
            line: row.line,
            reason: "not a currency amount".to_string(),
        })?;
    }

    let date = parse_date_fragment(&row.date, reference_year).map_err(|reason| PipelineError::DataFormat {
        column: DATE_COLUMN.to_string(),
        value: row.date.clone(),
        line: row.line,
        reason,
    })?;

    let [food, drink, modifier, gross, tax, total] = amounts;
    Ok(SalesRecord {
        date,
        food,
        drink,
        modifier,
        gross,
        tax,
        total,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // Keep the first occurrence if a header is repeated.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<ColumnIndex, PipelineError> {
    let mut amounts = [0usize; 6];
    for (slot, column) in amounts.iter_mut().zip(AMOUNT_COLUMNS) {
        *slot = *header_map
            .get(&column.to_ascii_lowercase())
            .ok_or_else(|| PipelineError::Schema {
                column: column.to_string(),
            })?;
    }

    let date = DATE_HEADER_ALIASES
        .iter()
        .find_map(|alias| header_map.get(*alias).copied())
        .or_else(|| header_map.get("").copied().filter(|&idx| idx == 0))
        .ok_or_else(|| PipelineError::Schema {
            column: DATE_COLUMN.to_string(),
        })?;

    Ok(ColumnIndex { date, amounts })
}

fn raw_row(record: &StringRecord, columns: &ColumnIndex, line: usize) -> RawSalesRow {
    let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
    let date = field(columns.date);
    let [food, drink, modifier, gross, tax, total] = columns.amounts.map(field);
    RawSalesRow {
        line,
        date,
        food,
        drink,
        modifier,
        gross,
        tax,
        total,
    }
}

/// Parse a currency-formatted amount such as `$17,600.00`.
///
/// `$` and `,` are stripped before parsing, so already-clean numbers pass
/// through unchanged. Empty and non-finite values are rejected.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Reconstruct a calendar date from a `MM/DD` fragment and a fixed year.
pub fn parse_date_fragment(fragment: &str, reference_year: i32) -> Result<NaiveDate, String> {
    let fragment = fragment.trim();
    let parts: Vec<&str> = fragment.split('/').collect();
    let well_formed = parts.len() == 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.len() <= 2 && p.chars().all(|c| c.is_ascii_digit()));
    if !well_formed {
        return Err(format!("expected a `MM/DD` date fragment, got '{fragment}'"));
    }

    let composed = format!("{}/{}/{reference_year}", parts[0], parts[1]);
    NaiveDate::parse_from_str(&composed, "%m/%d/%Y")
        .map_err(|e| format!("'{composed}' is not a valid calendar date ({e})"))
}
